// ABOUTME: Main library for schema-atlas
// ABOUTME: Contains the CLI entry point, response envelope, and module declarations

use std::process::ExitCode;

use clap::Parser;
use serde::{Deserialize, Serialize};

// Module declarations
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;

pub use db::{Introspector, PostgresConnection, ReflectOptions};
pub use error::{ItemKind, RegistryError};
pub use registry::{Engine, Node, Registry, Schema};

/// Standard response envelope printed by every command
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub messages: Messages,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Messages {
    pub error: Vec<String>,
    pub warning: Vec<String>,
    pub info: Vec<String>,
    pub success: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            messages: Messages::default(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            messages: Messages {
                error: vec![message],
                ..Default::default()
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.messages.warning.extend(warnings);
        self
    }

    pub fn with_info(mut self, message: impl Into<String>) -> Self {
        self.messages.info.push(message.into());
        self
    }
}

fn emit<T: Serialize>(response: ApiResponse<T>) -> ExitCode {
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize response: {}", e);
            return ExitCode::FAILURE;
        }
    }
    if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub fn run() -> ExitCode {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let args = cli::Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config_path = match args.config {
        Some(path) => path,
        None => match config::AppConfig::config_path() {
            Ok(path) => path,
            Err(e) => return emit(ApiResponse::<()>::error(format!("Failed to locate config: {}", e))),
        },
    };

    runtime.block_on(async move {
        use cli::{Command, ProfileAction};

        match args.command {
            Command::Profiles { action } => match action {
                ProfileAction::List => emit(commands::list_profiles(&config_path)),
                ProfileAction::Add(new_profile) => {
                    emit(commands::add_profile(&config_path, new_profile))
                }
                ProfileAction::Remove { name } => emit(commands::remove_profile(&config_path, &name)),
            },
            Command::TestConnection { profile } => {
                emit(commands::test_connection(&config_path, profile.as_deref()).await)
            }
            Command::Discover {
                profiles,
                include_views,
            } => emit(commands::discover(&config_path, &profiles, include_views).await),
            Command::Describe {
                path,
                profiles,
                include_views,
            } => emit(commands::describe(&config_path, &path, &profiles, include_views).await),
        }
    })
}
