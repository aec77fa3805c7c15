/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

#![allow(unused)]

use std::{env,path::{Path,PathBuf}};
use crate::*; // this includes utils
use crate::errors::*;

pub const CONFIGS: &'static str = "configs";

/// aggregate to specify both raw source and processing steps for embedded configs
pub struct EmbeddedConfigEntry {
    pub src: &'static [u8],
    pub is_encrypted: bool,
}

pub fn find_config_file (ctx: &Option<&BinContext>, resource_crate: &str, filename: &str) -> Option<PathBuf> {
    find_resource_file( CONFIGS, ctx, resource_crate, filename)
}

/// look up `<ODIN_ROOT>/<kind>/<resource_crate>/<filename>`, preferring a bin-specific
/// override at `<ODIN_ROOT>/<kind>/<bin_crate>/<bin_name>/<filename>` when `ctx` is given.
pub fn find_resource_file (kind: &str, ctx: &Option<&BinContext>, resource_crate: &str, filename: &str) -> Option<PathBuf> {
    let root = get_or_create_root_dir().ok()?;

    if let Some(bin_ctx) = ctx {
        let mut p = root.clone();
        p.push(kind);
        p.push(&bin_ctx.bin_crate);
        p.push(&bin_ctx.bin_name);
        p.push(filename);
        if p.is_file() { return Some(p) }
    }

    let mut p = root;
    p.push(kind);
    p.push(resource_crate);
    p.push(filename);
    if p.is_file() { Some(p) } else { None }
}

/// runtime (crate) part of config management
/// this is the main macro that needs to be expanded at the top of crates (lib.rs) that define configs.
/// Config users call the defined `load_config(..)` function to instantiate config structs
#[macro_export]
macro_rules! define_load_config {
    // odin_build is already imported in the target or otherwise this macro wouldn't be visible

    () => {
        mod configs {
            use lazy_static::lazy_static;
            use std::{collections::HashMap,path::Path};
            use serde::Deserialize;
            use ron;

            lazy_static! { // this is module-private
                static ref EMBEDDED_CONFIGS: HashMap<&'static str, odin_build::EmbeddedConfigEntry> = {
                    let mut map: HashMap<&'static str, odin_build::EmbeddedConfigEntry> = HashMap::new();
                    
                    #[cfg(feature="embedded_resources")]
                    include!(concat!(env!("OUT_DIR"), "/config_data")) (&mut map);
                    
                    map
                };
            }

            /// load config using odin_build - based lookup mechanism
            pub fn load_config<C> (filename: &str) -> odin_build::Result<C> where C: for <'a> serde::Deserialize<'a> {
                let bin_ctx = odin_build::BIN_CONTEXT.get();
                let resource_crate = env!("CARGO_PKG_NAME");

                // only do filesytem lookup if ODIN_EMBEDDED_ONLY env var is not enabled at runtime (set to 1|true|on)
                if !odin_build::is_env_enabled("ODIN_EMBEDDED_ONLY") {
                    if let Some(path) = odin_build::find_config_file( &bin_ctx, resource_crate, filename) {
                        let data = odin_build::file_contents_as_bytes(&path)?;
                        return Ok( ron::de::from_bytes( data.as_slice())? )
                    }
                }

                if let Some(ce) = EMBEDDED_CONFIGS.get( filename) {
                    let data = odin_build::decompress_vec( ce.src)?;
                    // ... this is where additional EmbeddedConfigEntry attribute processing (decryption etc) would take place
                    return Ok( ron::de::from_bytes( data.as_slice())? )
                }

                Err( odin_build::OdinBuildError::ResourceNotFoundError(filename.to_string()) )
            }
        }
        pub use configs::*; // make load_config() visible at the crate level
    }
}

