use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=NOEXCEPT_CXX_RUNTIME");

    if env::var_os("CARGO_FEATURE_LINK_CXX_RUNTIME").is_none() {
        return;
    }

    let target = env::var("TARGET").expect("TARGET was not set");

    // Allow overriding the runtime for toolchains which ship it under another name
    if let Ok(lib) = env::var("NOEXCEPT_CXX_RUNTIME") {
        println!("cargo:rustc-link-lib={}", lib);
        return;
    }

    if target.contains("msvc") || target.contains("wasm32") {
        panic!("the noexcept personality requires an Itanium C++ ABI target, got {}", target);
    } else if target.contains("apple")
        || target.contains("freebsd")
        || target.contains("openbsd")
        || target.contains("android")
    {
        println!("cargo:rustc-link-lib=c++");
    } else {
        println!("cargo:rustc-link-lib=stdc++");
    }
}
