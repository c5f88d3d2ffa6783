//! Functions the GUI can call to manage VFS instances.
//!
//! Every function takes a JSON array of arguments and answers with
//! `{"status": "success" | "error", "message": ..., "data": ...}`. Argument
//! problems surface as `Err`, which the registry turns into the error shape.

use anyhow::{bail, Context};
use serde_json::{json, Value};

use crate::host::catalog::VfsCatalog;
use crate::registry::FunctionRegistry;

pub const VFS_CREATE: &str = "vfs_create";
pub const VFS_ADD_FILE: &str = "vfs_addFile";
pub const VFS_SAVE: &str = "vfs_save";
pub const VFS_SAVE_ALL: &str = "vfs_saveAll";
pub const UTIL_LIST_FUNCTIONS: &str = "util_listFunctions";

pub fn register(registry: &FunctionRegistry, catalog: &VfsCatalog) {
    let vfs = catalog.clone();
    registry.register(VFS_CREATE, move |args| {
        let args = arguments(args, 1..=2)?;
        let name = string_arg(args, 0)?;

        match args.get(1) {
            Some(dir) => {
                let dir = dir.as_str().context("directory must be a string")?;
                vfs.create_persistent(name, dir)?;
                Ok(success(
                    format!("Created persistent VFS {name}"),
                    json!({ "name": name, "dir": dir }),
                ))
            }
            None => {
                vfs.create(name);
                Ok(success(format!("Created VFS {name}"), json!({ "name": name })))
            }
        }
    });

    let vfs = catalog.clone();
    registry.register(VFS_ADD_FILE, move |args| {
        let args = arguments(args, 3..=3)?;
        let name = string_arg(args, 0)?;
        let path = string_arg(args, 1)?;
        let content = string_arg(args, 2)?;

        vfs.add_file(name, path, content.to_string())?;
        Ok(success(
            format!("Added {path} to {name}"),
            json!({ "name": name, "path": path, "size": content.len() }),
        ))
    });

    let vfs = catalog.clone();
    registry.register(VFS_SAVE, move |args| {
        let args = arguments(args, 1..=1)?;
        let name = string_arg(args, 0)?;

        vfs.save(name)?;
        Ok(success(format!("Saved VFS {name}"), json!({ "name": name })))
    });

    let vfs = catalog.clone();
    registry.register(VFS_SAVE_ALL, move |args| {
        arguments(args, 0..=0)?;

        if !vfs.save_all() {
            bail!("Failed to save one or more VFS instances");
        }
        Ok(success("Saved all VFS instances", json!({ "names": vfs.names() })))
    });

    let functions = registry.clone();
    registry.register(UTIL_LIST_FUNCTIONS, move |args| {
        arguments(args, 0..=0)?;

        let names = functions.names();
        Ok(success(format!("{} functions registered", names.len()), json!(names)))
    });
}

pub fn success(message: impl Into<String>, data: Value) -> Value {
    json!({
        "status": "success",
        "message": message.into(),
        "data": data,
    })
}

/// `null` counts as no arguments.
fn arguments(args: &Value, expected: std::ops::RangeInclusive<usize>) -> anyhow::Result<&[Value]> {
    let args: &[Value] = match args {
        Value::Null => &[],
        Value::Array(items) => items,
        _ => bail!("Arguments must be an array"),
    };

    if !expected.contains(&args.len()) {
        if expected.start() == expected.end() {
            bail!(
                "Invalid number of arguments: expected {}, got {}",
                expected.start(),
                args.len()
            );
        }
        bail!(
            "Invalid number of arguments: expected {} to {}, got {}",
            expected.start(),
            expected.end(),
            args.len()
        );
    }
    Ok(args)
}

fn string_arg(args: &[Value], index: usize) -> anyhow::Result<&str> {
    args.get(index)
        .and_then(Value::as_str)
        .with_context(|| format!("argument {index} must be a string"))
}
