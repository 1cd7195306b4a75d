use std::path::PathBuf;

// -------------------------------------------------------------------------------------------------

fn main() {
    // set up cargo build environment
    println!("cargo:rerun-if-env-changed=CC");
    println!("cargo:rerun-if-env-changed=CXX");
    println!("cargo:rerun-if-env-changed=CFLAGS");
    println!("cargo:rerun-if-env-changed=CXXFLAGS");
    println!("cargo:rerun-if-env-changed=SPEEDY_LIB_DIR");

    println!("cargo:rerun-if-changed=vendor/");
    println!("cargo:rerun-if-changed=vendor/speedy/CMakeLists.txt");
    println!("cargo:rerun-if-changed=vendor/sonic/");

    // link prebuilt static libraries when asked to, else build from the vendored sources
    if let Ok(lib_dir) = std::env::var("SPEEDY_LIB_DIR") {
        link_prebuilt(&lib_dir);
    } else {
        // build speedy C++ lib with cmake
        build_speedy();
        // build sonic C lib with speedy support
        build_sonic();
    }
}

// -------------------------------------------------------------------------------------------------

fn link_prebuilt(lib_dir: &str) {
    println!("cargo:rustc-link-search=native={lib_dir}");
    println!("cargo:rustc-link-lib=static=sonic2");
    println!("cargo:rustc-link-lib=static=speedy");
    println!("cargo:rustc-link-lib=static=kissfft-float");
    link_cpp_runtime();
}

// -------------------------------------------------------------------------------------------------

fn build_speedy() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let target_triple = std::env::var("TARGET").unwrap();

    if target_triple.contains("android") {
        panic!("android builds are not (yet) supported");
    }

    // Seems Rust always links against the release version of the MSVC runtime,
    // even in debug builds. So force building cmake release configs here...
    let profile = match std::env::var("PROFILE").unwrap().as_str() {
        "release" => "Release",
        _ => "RelWithDebInfo",
    };

    let _ = cmake::Config::new("vendor/speedy")
        .profile(profile)
        .define("CMAKE_EXPORT_COMPILE_COMMANDS", "ON")
        .define("CMAKE_MSVC_RUNTIME_LIBRARY", "MultiThreaded")
        .define("BUILD_SHARED_LIBS", "OFF")
        .build_target("speedy")
        .build();

    // link speedy C++ lib
    let build_dir = format!("{}", out_dir.join("build").display());
    println!("cargo:rustc-link-search=native={build_dir}");
    println!("cargo:rustc-link-search=native={build_dir}/{profile}");
    println!("cargo:rustc-link-search=native={build_dir}/third_party/kissfft");
    println!("cargo:rustc-link-search=native={build_dir}/third_party/kissfft/{profile}");

    println!("cargo:rustc-link-lib=static=speedy");
    println!("cargo:rustc-link-lib=static=kissfft-float");
    link_cpp_runtime();
}

// -------------------------------------------------------------------------------------------------

fn build_sonic() {
    let cargo_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    let sonic_dir = cargo_dir.join("vendor").join("sonic");
    let speedy_dir = cargo_dir.join("vendor").join("speedy");

    // sonic2 is sonic built with the speedy nonlinear speedup hooks enabled
    cc::Build::new()
        .static_crt(true) // see CMAKE_MSVC_RUNTIME_LIBRARY above
        .file(sonic_dir.join("sonic.c"))
        .define("SONIC_SPEEDY", None)
        .define("KISS_FFT", None)
        .include(&sonic_dir)
        .include(&speedy_dir)
        .warnings(false)
        .compile("sonic2");
}

// -------------------------------------------------------------------------------------------------

fn link_cpp_runtime() {
    let target = std::env::var("TARGET").unwrap();
    if target.contains("apple") {
        println!("cargo:rustc-link-lib=dylib=c++");
    } else if !target.contains("msvc") && !target.contains("emscripten") {
        println!("cargo:rustc-link-lib=dylib=stdc++");
    }
}
