use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let protoc = protoc_bin_vendored::protoc_bin_path()?;
    let well_known = protoc_bin_vendored::include_path()?;
    // SAFETY: build 脚本单线程运行，此时没有其他线程读取环境变量
    unsafe { env::set_var("PROTOC", protoc) };

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("printer_descriptor.bin"))
        .compile_protos(
            &[PathBuf::from("../../proto/printer/v1/printer.proto")],
            &[PathBuf::from("../../proto"), well_known],
        )?;

    println!("cargo:rerun-if-changed=../../proto/printer/v1/printer.proto");
    Ok(())
}
