//! Interface de linha de comando baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (report, config) e
//! flags globais que sobrescrevem o arquivo de configuração.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::PceConfig;

/// Relatório de estado dos workloads gerenciados por um PCE.
#[derive(Debug, Parser)]
#[command(name = "pce-workloads", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./pce-workloads.toml).
    #[arg(long = "config", global = true)]
    pub config_file: Option<PathBuf>,

    /// Endereço base do PCE, ex.: https://pce.example.com:8443.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Identificador da organização.
    #[arg(long, global = true)]
    pub org: Option<String>,

    /// Caminho do CSV gerado.
    #[arg(long, short, global = true)]
    pub output: Option<PathBuf>,

    /// Máximo de consultas ao status de um job assíncrono.
    #[arg(long, global = true)]
    pub max_poll_attempts: Option<u32>,

    /// Aceita certificados TLS inválidos.
    #[arg(long, global = true, default_value_t = false)]
    pub insecure: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every workload, print the state table and write the CSV.
    Report {
        /// Read workloads from a saved JSON response instead of the PCE.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show the effective configuration (API key masked).
    Config,
}

impl Cli {
    /// Flags given on the command line win over file and environment.
    pub fn apply_overrides(&self, config: &mut PceConfig) {
        if let Some(server) = &self.server {
            config.server = server.clone();
        }
        if let Some(org) = &self.org {
            config.org = org.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(attempts) = self.max_poll_attempts {
            config.max_poll_attempts = attempts;
        }
        if self.insecure {
            config.insecure = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_report_subcommand() {
        let cli = Cli::parse_from(["pce-workloads", "report"]);
        match cli.command {
            Command::Report { file } => assert!(file.is_none()),
            _ => panic!("expected Report command"),
        }
    }

    #[test]
    fn cli_parses_report_from_file() {
        let cli = Cli::parse_from(["pce-workloads", "report", "--file", "dump.json"]);
        match cli.command {
            Command::Report { file } => assert_eq!(file, Some(PathBuf::from("dump.json"))),
            _ => panic!("expected Report command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "pce-workloads",
            "--server",
            "https://pce.example.com:8443",
            "--org",
            "2",
            "-o",
            "/tmp/out.csv",
            "--max-poll-attempts",
            "8",
            "--insecure",
            "--verbose",
            "report",
        ]);
        assert!(cli.verbose);
        assert!(cli.insecure);
        assert_eq!(cli.server.as_deref(), Some("https://pce.example.com:8443"));
        assert_eq!(cli.max_poll_attempts, Some(8));
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from(["pce-workloads", "config", "--org", "4", "-o", "x.csv"]);
        let mut config = PceConfig {
            server: "https://from-file:8443".into(),
            ..Default::default()
        };
        cli.apply_overrides(&mut config);
        assert_eq!(config.org, "4");
        assert_eq!(config.output, PathBuf::from("x.csv"));
        assert_eq!(config.server, "https://from-file:8443");
        assert!(!config.insecure);
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
