//! First-run interactive setup and the pre-run confirmation

use anyhow::{Context, Result};
use std::io::Write;

fn prompt(question: &str) -> Result<String> {
    print!("{} ", question);
    std::io::stdout().flush().context("cannot flush stdout")?;
    let mut answer = String::new();
    let bytes = std::io::stdin()
        .read_line(&mut answer)
        .context("cannot read from stdin")?;
    if bytes == 0 {
        anyhow::bail!("stdin closed before setup finished");
    }
    Ok(answer.trim().to_string())
}

fn confirm(question: &str) -> Result<bool> {
    loop {
        match prompt(&format!("{} (y/n)", question))?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}

/// Ask for an existing directory, re-prompting until the user confirms one.
async fn prompt_directory(question: &str) -> Result<std::path::PathBuf> {
    loop {
        let answer = prompt(question)?;
        if answer.is_empty() {
            continue;
        }
        let path = std::path::PathBuf::from(answer.trim_end_matches('/'));
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => {
                if confirm(&format!("Use {}?", path.display()))? {
                    return Ok(path);
                }
            }
            _ => println!("{} is not an existing directory.", path.display()),
        }
    }
}

/// Interactive first-run setup: ask for the source and backup directories,
/// offer a numbered picker over the source's subdirectories for the ignore
/// list, then write the configuration file.
///
/// The source's hidden entries and any `Backup/` nested inside it are always
/// ignored; the picker only adds to that.
pub async fn run_wizard(config_path: &std::path::Path) -> Result<common::Config> {
    println!("No configuration found, let's create one.");
    let source_root = prompt_directory("Which directory would you like to back up?").await?;
    let backup_parent = prompt_directory("Which directory should hold the backups?").await?;
    let backup_root = backup_parent.join(common::config::BACKUP_DIR);
    let mut ignore_entries = vec![
        format!("{}/.", source_root.display()),
        format!("{}/{}/", source_root.display(), common::config::BACKUP_DIR),
    ];
    let subdirs = common::walk::list_subdirs(&source_root).await?;
    if !subdirs.is_empty() && confirm("Would you like to ignore any subdirectories?")? {
        loop {
            println!("Subdirectories of {}:", source_root.display());
            for (index, dir) in subdirs.iter().enumerate() {
                println!("  {}. {}", index + 1, dir.display());
            }
            let answer = prompt("Number to ignore (empty to finish):")?;
            if answer.is_empty() {
                break;
            }
            match answer.parse::<usize>() {
                Ok(number) if (1..=subdirs.len()).contains(&number) => {
                    let entry = subdirs[number - 1].to_string_lossy().into_owned();
                    if !ignore_entries.contains(&entry) {
                        ignore_entries.push(entry);
                    }
                }
                _ => println!("Please enter a number between 1 and {}.", subdirs.len()),
            }
        }
    }
    let config = common::Config {
        source_root,
        backup_root,
        ignore_entries,
    };
    common::config::write_config(&config, config_path)
        .await
        .with_context(|| format!("cannot write configuration to {:?}", config_path))?;
    println!("Configuration written to {}.", config_path.display());
    Ok(config)
}

/// Show what a run would cover and ask for a go-ahead.
pub async fn confirm_run(config: &common::Config) -> Result<bool> {
    println!(
        "About to back up {} to {}.",
        config.source_root.display(),
        config.backup_root.display()
    );
    let ignore = config.ignore_list();
    let subdirs = common::walk::list_subdirs(&config.source_root).await?;
    let included: Vec<_> = subdirs.iter().filter(|dir| !ignore.should_skip(dir)).collect();
    if !included.is_empty() {
        println!("Subdirectories included in this run:");
        for dir in &included {
            println!("  {}", dir.display());
        }
    }
    confirm("Continue?")
}
