//! Binary for building WASM contracts from odra modules.
#![doc = "Binary for building WASM contracts from odra modules."]

#[allow(unused_imports)]
use collateral_lending;

fn main() {
    // Compilation itself is driven by odra-build
}
