// build.rs

fn main() {
    // The FFI driver is only compiled with the `native` feature, so only
    // then does the engine library need to be found and linked.
    if std::env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    // pkg-config is the standard way to find linking information on
    // Unix-like systems. If it fails (not installed, or the .pc file is
    // missing), fall back to manually specifying common linker flags.
    match pkg_config::probe_library("notcurses") {
        Ok(_) => {
            eprintln!("pkg-config found notcurses. Linking configured automatically.");
        }
        Err(_) => {
            eprintln!("pkg-config failed for 'notcurses'. Falling back to manual linking.");
            println!("cargo:rustc-link-lib=notcurses");
            // Standard search paths. Adjust LIBRARY_PATH if the library
            // lives somewhere else.
            println!("cargo:rustc-link-search=/usr/lib");
            println!("cargo:rustc-link-search=/usr/local/lib");
            eprintln!(
                "Manual linking flags applied. Ensure the notcurses development library is installed."
            );
        }
    }
}
