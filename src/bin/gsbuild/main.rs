//! gsbuild - configure and build the GoldenSun CMake projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use gsbuild::builder::{BuildInfo, SystemHost, SystemRunner};
use gsbuild::ops::build_projects;
use gsbuild::util::config::{global_config_path, load_config, project_config_path, Config};
use gsbuild::util::shell::{PausePolicy, Shell};

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = EnvFilter::try_from_env("GSBUILD_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("gsbuild=debug")
        } else {
            EnvFilter::new("gsbuild=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Load configuration (global + project)
    let config = load_config(
        global_config_path().as_deref(),
        &project_config_path(&cli.source),
    );

    let no_pause = cli.no_pause || config.build.pause == Some(false);
    let pause = PausePolicy::resolve(no_pause, std::env::var("CI").ok().as_deref());
    let shell = Shell::new(cli.color, pause);

    if let Err(e) = run(&cli, &config, &shell) {
        shell.fatal(e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config, shell: &Shell) -> Result<()> {
    let request = cli.build_request(&config.build);
    tracing::debug!("request: {:?}", request);

    let info = BuildInfo::resolve(&request, &SystemHost)?;

    if cli.json {
        shell.print(info.to_json());
    } else {
        shell.info(info.summary().trim_end());
    }

    if cli.dry_run {
        return Ok(());
    }

    let targets = cli.targets(&config.build);
    let cmake_args = cli.cmake_args(&config.build);

    for compiler in info.compilers() {
        build_projects(
            &cli.name,
            &cli.source,
            &info,
            compiler,
            &targets,
            &cmake_args,
            shell,
            &SystemRunner,
        )?;
    }

    tracing::info!("{} built for {} architecture(s)", cli.name, info.compilers().len());
    Ok(())
}
