extern crate cc;

use std::env;
use std::fs;
use std::path::PathBuf;

const FIXTURE: &str = "fixtures/boundary.cpp";

const HOST_PERSONALITY: &str = "__gxx_personality_v0";
const NOEXCEPT_PERSONALITY: &str = "__noexcept_personality";

fn main() {
    // Emits `has_cxx_fixture` when the fixture was built
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", FIXTURE);
    println!("cargo:rustc-check-cfg=cfg(has_cxx_fixture)");

    let os = env::var("CARGO_CFG_TARGET_OS").expect("CARGO_CFG_TARGET_OS was not set");
    let target_env = env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();
    let arch = env::var("CARGO_CFG_TARGET_ARCH").expect("CARGO_CFG_TARGET_ARCH was not set");
    // The fixture needs libstdc++ and the generic Itanium unwinder
    if os != "linux" || target_env != "gnu" || !matches!(arch.as_str(), "x86_64" | "aarch64") {
        return;
    }

    let out_dir = env::var_os("OUT_DIR").map(PathBuf::from).expect("OUT_DIR was not set");
    let asm = out_dir.join("boundary.s");

    // Compile to assembly first, so that every function can be switched over
    // to the noexcept personality, as the compiler pass would do.
    let compiler = cc::Build::new().cpp(true).get_compiler();
    let mut cmd = compiler.to_command();
    cmd.args(["-S", "-fexceptions", "-std=c++11", "-o"])
        .arg(&asm)
        .arg(FIXTURE);
    match cmd.status() {
        Ok(status) if status.success() => (),
        Ok(status) => panic!("compiling {} failed: {}", FIXTURE, status),
        Err(err) => {
            println!(
                "cargo:warning=unable to run the C++ compiler ({}), skipping the C++ fixture",
                err
            );
            return;
        }
    }

    let source = fs::read_to_string(&asm).expect("unable to read the fixture assembly");
    assert!(
        source.contains(HOST_PERSONALITY),
        "expected the fixture to refer to {}",
        HOST_PERSONALITY
    );
    fs::write(&asm, source.replace(HOST_PERSONALITY, NOEXCEPT_PERSONALITY))
        .expect("unable to write the fixture assembly");

    cc::Build::new()
        .cpp(true)
        .file(&asm)
        .compile("noexcept_fixture");
    println!("cargo:rustc-cfg=has_cxx_fixture");
}
