use std::{fs::File, io::Write, path::Path};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::error::AppError;

use super::npy::NpyArray;

/// 按 `numpy.savez_compressed` 的布局写出：每个成员为 deflate 压缩的 `<name>.npy`。
pub fn write_npz(path: &Path, members: &[(&str, &NpyArray)]) -> Result<(), AppError> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    for (name, array) in members {
        zip.start_file(format!("{name}.npy"), options)?;
        zip.write_all(&array.to_bytes())?;
    }
    zip.finish()?;
    Ok(())
}
