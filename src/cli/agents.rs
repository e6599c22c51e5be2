// agents: inspect definitions, classify requests, run session tools

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use crate::agents::{self, route_request, ToolSpec};
use crate::config::AgentConfig;
use crate::tools::{self, SessionState};

use super::{print_info, print_success};

#[derive(Args, Debug)]
pub struct AgentsArgs {
    #[command(subcommand)]
    pub command: AgentsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AgentsCommand {
    /// List every agent with its tools
    List,
    /// Print one agent definition as JSON
    Show { name: String },
    /// Export all definitions for the hosted runtime
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show which specialist a request would be routed to
    Route { message: String },
    /// Run a session tool against a JSON session file
    Tool {
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Session file, created when missing
        #[arg(long, default_value = "session.json")]
        session: PathBuf,
    },
}

fn load_session(path: &Path) -> anyhow::Result<SessionState> {
    if !path.exists() {
        return Ok(SessionState::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read session file {}", path.display()))?;
    Ok(SessionState::from_json(&raw)?)
}

/// Invokes `name` on the session stored at `path` and writes the session back.
pub fn run_tool(name: &str, raw_args: &str, path: &Path) -> anyhow::Result<Value> {
    let args: Value = serde_json::from_str(raw_args).context("tool arguments must be JSON")?;
    let mut session = load_session(path)?;
    let result = tools::invoke(name, &args, &mut session)?;
    std::fs::write(path, session.to_json()?)
        .with_context(|| format!("cannot write session file {}", path.display()))?;
    Ok(result)
}

pub fn run(config: &AgentConfig, args: &AgentsArgs) -> anyhow::Result<()> {
    match &args.command {
        AgentsCommand::List => {
            for agent in agents::all_agents(config) {
                println!("{} ({})", style(&agent.name).bold(), agent.model);
                println!("  {}", agent.description);
                let tools: Vec<String> = agent.tools.iter().map(ToolSpec::label).collect();
                println!("  tools: {}", tools.join(", "));
                if let Some(key) = &agent.output_key {
                    println!("  output: {}", key);
                }
            }
        }
        AgentsCommand::Show { name } => {
            let agent = agents::find_agent(config, name)?;
            println!("{}", serde_json::to_string_pretty(&agent)?);
        }
        AgentsCommand::Export { output } => {
            let exported = agents::export(config)?;
            match output {
                Some(path) => {
                    std::fs::write(path, exported)?;
                    print_success(&format!("Agent definitions written to {}", path.display()));
                }
                None => println!("{}", exported),
            }
        }
        AgentsCommand::Route { message } => {
            let decision = route_request(message);
            if decision.fallback {
                print_info(&format!("No specialist matched, routing to {}", decision.agent));
            } else {
                print_info(&format!(
                    "Routing to {} (matched: {})",
                    decision.agent,
                    decision.matched.join(", ")
                ));
            }
        }
        AgentsCommand::Tool {
            name,
            args: raw_args,
            session,
        } => {
            let result = run_tool(name, raw_args, session)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_state_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        run_tool(
            "extract_student_info",
            r#"{"report_data": "Student: Emma\nGrade: 2\nSchool: Oak View"}"#,
            &path,
        )
        .unwrap();
        let summary = run_tool("get_session_summary", "{}", &path).unwrap();
        assert!(path.exists());

        let session = load_session(&path).unwrap();
        assert_eq!(session.student_profile.unwrap().name, "emma");
        assert!(summary.is_object());
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert!(run_tool("get_session_summary", "not json", &path).is_err());
        assert!(run_tool("no_such_tool", "{}", &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("agents.json");
        let config = AgentConfig {
            model: "gemini-2.0-flash".to_string(),
            rag_corpus: None,
            sample_profile_path: "sample/sample_student_profile.json".to_string(),
        };
        let args = AgentsArgs {
            command: AgentsCommand::Export {
                output: Some(output.clone()),
            },
        };
        run(&config, &args).unwrap();
        let value: Value = serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(value["agents"].as_array().unwrap().len(), 8);
    }
}
