use shellm::audit::AuditLogger;
use shellm::config::Config;
use shellm::exec::{Executor, ExecError};
use shellm::llm::{ContextBuilder, OllamaClient, Translator};
use shellm::security::CommandValidator;
use shellm::AppResult;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Config::load_or_default()?;

    let validator = CommandValidator::with_policy(config.security_policy());
    let mut executor = Executor::with_timeout(
        validator,
        Duration::from_secs(config.exec.timeout_seconds),
    );

    let client = Box::new(OllamaClient::with_endpoint(
        &config.llm.base_url,
        &config.llm.model,
    ));
    let translator = Translator::new(client, ContextBuilder::new());

    let logger = match AuditLogger::new() {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("Warning: audit log unavailable: {e}");
            None
        }
    };
    let logging_enabled = config.behavior.log_commands;

    println!("shellm - describe what you want to do. Type 'exit' to quit, 'undo' to revert.");

    let stdin = io::stdin();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();

        if input.is_empty() {
            continue;
        }

        // 'sair' and 'desfazer' kept for compatibility with earlier releases
        match input.to_lowercase().as_str() {
            "exit" | "quit" | "sair" => break,
            "undo" | "desfazer" => {
                let result = executor.undo();
                report(&result);
                if let (Some(logger), true) = (&logger, logging_enabled) {
                    if let Err(e) = logger.log_result(&result) {
                        eprintln!("Warning: failed to write audit log: {e}");
                    }
                }
                continue;
            }
            _ => {}
        }

        let proposal = match translator.translate(input).await {
            Ok(proposal) => proposal,
            Err(e) => {
                println!("No command available: {e}");
                continue;
            }
        };

        println!("Proposed command: {}", proposal.command);

        if config.behavior.confirm_before_execute && !confirm()? {
            println!("Skipped.");
            continue;
        }

        let result = executor.execute(&proposal.command).await;
        report(&result);

        if let (Some(logger), true) = (&logger, logging_enabled) {
            if let Err(e) = logger.log_result(&result) {
                eprintln!("Warning: failed to write audit log: {e}");
            }
            if let Some(ExecError::SecurityBlocked(reason)) = &result.error {
                if let Err(e) = logger.log_validation_failure(input, &result.command, reason) {
                    eprintln!("Warning: failed to write audit log: {e}");
                }
            }
        }
    }

    Ok(())
}

fn confirm() -> io::Result<bool> {
    print!("Run it? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn report(result: &shellm::CommandResult) {
    if result.success {
        if result.output.is_empty() {
            println!("Done.");
        } else {
            println!("{}", result.output.trim_end());
        }
    } else {
        match &result.error {
            Some(error) => println!("Error: {error}"),
            None => println!("Error: command failed"),
        }
    }
}
