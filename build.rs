fn main() {
    println!("cargo:rerun-if-changed=include/proclist.h");

    #[cfg(feature = "header-bindings")]
    generate_bindings();
}

/// 根据 C 头文件生成绑定，供布局校验测试使用
#[cfg(feature = "header-bindings")]
fn generate_bindings() {
    use std::env;
    use std::path::PathBuf;

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    let mut builder = bindgen::Builder::default()
        .header("include/proclist.h")
        .allowlist_type("process")
        .allowlist_function("FillBuffer|FillBufferChecked|ReleaseAll|LiveAllocations|KillProcess")
        .allowlist_var("PROCLIST_.*");

    // 根据目标平台添加不同的配置
    if target_os == "macos" {
        builder = builder
            .clang_arg("-I/usr/include")
            .clang_arg("-I/Library/Developer/CommandLineTools/SDKs/MacOSX.sdk/usr/include");
    }

    let bindings = builder
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}
