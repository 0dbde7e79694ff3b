use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=NICKEL_FFI_LIB_DIR");
    println!("cargo:rerun-if-env-changed=NICKEL_FFI_STATIC");

    // Nothing to link unless the embedded evaluator is requested
    if env::var_os("CARGO_FEATURE_LINKED").is_none() {
        return;
    }

    if let Some(dir) = env::var_os("NICKEL_FFI_LIB_DIR") {
        let dir = PathBuf::from(dir);
        if !dir.join(library_file_name(true)).exists() && !dir.join(library_file_name(false)).exists()
        {
            println!(
                "cargo:warning=NICKEL_FFI_LIB_DIR={} does not contain the nickel_ffi library",
                dir.display()
            );
        }
        println!("cargo:rustc-link-search=native={}", dir.display());
    } else {
        println!(
            "cargo:warning=NICKEL_FFI_LIB_DIR is not set; relying on the system library path to find nickel_ffi"
        );
    }

    let is_static = env::var_os("NICKEL_FFI_STATIC").is_some();
    if is_static {
        println!("cargo:rustc-link-lib=static=nickel_ffi");
    } else {
        println!("cargo:rustc-link-lib=dylib=nickel_ffi");
        return;
    }

    // A static archive built from Rust needs the platform libraries its std
    // links against
    let target = env::var("TARGET")
        .unwrap_or_else(|_| env::var("HOST").expect("Neither TARGET nor HOST set by cargo"));

    if target.contains("windows") {
        println!("cargo:rustc-link-lib=ws2_32");
        println!("cargo:rustc-link-lib=userenv");
        println!("cargo:rustc-link-lib=ntdll");
        println!("cargo:rustc-link-lib=bcrypt");
    } else {
        println!("cargo:rustc-link-lib=pthread");
        println!("cargo:rustc-link-lib=m");
        println!("cargo:rustc-link-lib=dl");

        if target.contains("apple") || target.contains("darwin") {
            println!("cargo:rustc-link-lib=framework=Security");
            println!("cargo:rustc-link-lib=framework=CoreFoundation");
        }
    }
}

fn library_file_name(is_static: bool) -> &'static str {
    match (is_static, cfg!(windows)) {
        (true, true) => "nickel_ffi.lib",
        (true, false) => "libnickel_ffi.a",
        (false, true) => "nickel_ffi.dll",
        (false, false) if cfg!(target_os = "macos") => "libnickel_ffi.dylib",
        (false, false) => "libnickel_ffi.so",
    }
}
