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

use std::sync::OnceLock;

/// identifies the binary (and its crate) that is currently running, so that config/resource
/// lookup can pick bin-specific variants when more than one binary shares a crate's resources.
#[derive(Debug,Clone)]
pub struct BinContext {
    pub bin_name: String,
    pub bin_crate: String,
}

pub static BIN_CONTEXT: OnceLock<BinContext> = OnceLock::new();

/// set the process-global [`BinContext`] from `CARGO_BIN_NAME`/`CARGO_PKG_NAME`, which cargo
/// sets for the currently built binary target. Call this once, near the top of `main()`.
#[macro_export]
macro_rules! set_bin_context {
    () => {
        let _ = odin_build::BIN_CONTEXT.set( odin_build::BinContext {
            bin_name: env!("CARGO_BIN_NAME").to_string(),
            bin_crate: env!("CARGO_PKG_NAME").to_string(),
        });
    }
}
