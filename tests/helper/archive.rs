//! Release archive and fake CLI helpers

use std::path::Path;

/// Builds a `.tar.gz` with a single executable file
pub fn tar_gz_with(name: &str, content: &[u8]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append_data(&mut header, name, content).unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

/// Shell script standing in for coolify-cli, recording its arguments to `record`
pub fn recording_script(record: &Path) -> String {
    format!("#!/bin/sh\necho \"$@\" > {}\n", record.display())
}

/// Writes an executable `coolify` into `dir`
#[cfg(unix)]
pub fn install_fake_tool(dir: &Path, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("coolify");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
