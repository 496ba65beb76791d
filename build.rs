//! Build script for the PWM demo firmware
//!
//! Adds the manifest directory to the linker search path so a board
//! specific `memory.x` there takes effect. embassy-stm32 provides one
//! for the selected chip otherwise.

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR") {
        println!("cargo:rustc-link-search={dir}");
    }
}
