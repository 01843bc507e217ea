//! Common test utilities

#![allow(dead_code)]

use cmdhost::{Arguments, CommandBuilder, Host, ParameterDecl, SharedBuffer, ValueType};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Arguments captured by the last invocation of a recording command
pub type Recorded = Arc<Mutex<Option<Arguments>>>;

/// A host named `TestApp` writing into an in-memory buffer
pub fn capture_host() -> (Host, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let host = Host::builder()
        .name("TestApp")
        .description("A cool CLI description")
        .writer(buffer.clone())
        .build()
        .unwrap();
    (host, buffer)
}

/// Register `test <input> [-c|--count N]`, recording what it was called with
pub fn register_test_command(host: &Host) -> Recorded {
    let recorded: Recorded = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&recorded);
    host.register(
        CommandBuilder::new("test")
            .description("Runs a test")
            .alias("t")
            .parameter(ParameterDecl::argument("input", ValueType::String).description("Input value"))
            .parameter(
                ParameterDecl::option("count", ValueType::Integer)
                    .short("c")
                    .long("count"),
            )
            .run(move |args| {
                *sink.lock().unwrap() = Some(args.clone());
                Ok(())
            }),
    )
    .unwrap();
    recorded
}

/// The recorded arguments, panicking if the command never ran
pub fn last_call(recorded: &Recorded) -> Arguments {
    recorded
        .lock()
        .unwrap()
        .clone()
        .expect("command was not invoked")
}

/// Create a temporary directory with a cmdhost.yml file
pub fn create_test_manifest(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cmdhost.yml");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

/// Create a test manifest with an empty subdirectory next to it
pub fn create_test_manifest_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, path) = create_test_manifest(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, path, sub_dir)
}
