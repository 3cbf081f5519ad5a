//! Filesystem family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! fs_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Fs(pb::FsCall {
                op: Some(pb::fs_call::Op::$op($msg)),
            })),
        })
    };
}

fn read_file(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("read_file", "path")?;
    fs_variant!(ReadFile, pb::ReadFileCall { path })
}

fn write_file(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("write_file", "path")?;
    let data = p.require_bytes("write_file", "data")?;
    fs_variant!(WriteFile, pb::WriteFileCall { path, data })
}

fn create_file(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("create_file", "path")?;
    fs_variant!(CreateFile, pb::CreateFileCall { path })
}

fn delete_file(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("delete_file", "path")?;
    fs_variant!(DeleteFile, pb::DeleteFileCall { path })
}

fn list_directory(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("list_directory", "path")?;
    fs_variant!(ListDirectory, pb::ListDirectoryCall { path })
}

fn file_exists(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("file_exists", "path")?;
    fs_variant!(FileExists, pb::FileExistsCall { path })
}

fn file_stat(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("file_stat", "path")?;
    fs_variant!(FileStat, pb::FileStatCall { path })
}

fn move_file(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let src = p.require_str("move_file", "src")?;
    let dst = p.require_str("move_file", "dst")?;
    fs_variant!(MoveFile, pb::MoveFileCall { src, dst })
}

fn copy_file(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let src = p.require_str("copy_file", "src")?;
    let dst = p.require_str("copy_file", "dst")?;
    fs_variant!(CopyFile, pb::CopyFileCall { src, dst })
}

fn create_directory(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("create_directory", "path")?;
    fs_variant!(CreateDirectory, pb::CreateDirectoryCall { path })
}

fn remove_directory(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("remove_directory", "path")?;
    fs_variant!(RemoveDirectory, pb::RemoveDirectoryCall { path })
}

fn get_working_directory(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    fs_variant!(GetWorkingDirectory, pb::GetWorkingDirectoryCall {})
}

fn set_working_directory(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("set_working_directory", "path")?;
    fs_variant!(SetWorkingDirectory, pb::SetWorkingDirectoryCall { path })
}

fn truncate_file(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("truncate_file", "path")?;
    let size = p.require_u64("truncate_file", "size")?;
    fs_variant!(TruncateFile, pb::TruncateFileCall { path, size })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("read_file", read_file);
    table.insert("write_file", write_file);
    table.insert("create_file", create_file);
    table.insert("delete_file", delete_file);
    table.insert("list_directory", list_directory);
    table.insert("file_exists", file_exists);
    table.insert("file_stat", file_stat);
    table.insert("move_file", move_file);
    table.insert("copy_file", copy_file);
    table.insert("create_directory", create_directory);
    table.insert("remove_directory", remove_directory);
    table.insert("get_working_directory", get_working_directory);
    table.insert("set_working_directory", set_working_directory);
    table.insert("truncate_file", truncate_file);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_file_builds_fs_variant() {
        let p = Params::new().insert("path", "/etc/hosts");
        let v = read_file(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Fs(pb::FsCall {
                op: Some(pb::fs_call::Op::ReadFile(inner)),
            })) => assert_eq!(inner.path, "/etc/hosts"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn write_file_defaults_missing_data_to_empty() {
        let p = Params::new().insert("path", "/tmp/x");
        let v = write_file(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Fs(pb::FsCall {
                op: Some(pb::fs_call::Op::WriteFile(inner)),
            })) => assert!(inner.data.is_empty()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn write_file_rejects_data_of_the_wrong_type() {
        let p = Params::new().insert("path", "/tmp/x").insert("data", 5u64);
        assert!(write_file(&p).is_err());
    }
}
