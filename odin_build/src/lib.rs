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

//! `odin_build` provides the runtime resource-lookup and config-loading machinery shared
//! by all `odin_rapid_*` crates: locating per-crate RON config files relative to an
//! `ODIN_ROOT` directory (falling back to resources embedded at build time), and the
//! `BinContext` that records which binary is currently running so per-bin config variants
//! can be selected.

mod errors;
mod utils;
mod configs;
mod context;

pub use errors::*;
pub use utils::*;
pub use configs::*;
pub use context::*;

/* #region cargo build-script diagnostics ************************************************/

// this is a hack to avoid the warning output from Cargo. Hopefully Cargo will some day support build script messages directly

#[macro_export]
macro_rules! info {
    ($($tokens: tt)*) => {
        println!("cargo:warning=\r\x1b[32;1m  \x1b[37m info: {}\x1b[0m", format!($($tokens)*))
    }
}

#[macro_export]
macro_rules! warn {
    ($($tokens: tt)*) => {
        println!("cargo:warning=\r\x1b[32;1m  \x1b[93m warn: {}\x1b[0m", format!($($tokens)*))
    }
}

#[macro_export]
macro_rules! error {
    ($($tokens: tt)*) => {
        println!("cargo:warning=\r\x1b[32;1m  \x1b[91m error: {}\x1b[0m", format!($($tokens)*))
    }
}

/* #endregion cargo build-script diagnostics */
