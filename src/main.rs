// ABOUTME: Entry point for the schema-atlas command line tool
// ABOUTME: Calls the library run function and forwards its exit code

use std::process::ExitCode;

fn main() -> ExitCode {
    schema_atlas_lib::run()
}
