use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["xopt-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_and_seed_commands() {
    let cli = Cli::try_parse_from(["xopt-cli", "db", "migrate"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));

    let cli = Cli::try_parse_from(["xopt-cli", "db", "seed"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["xopt-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn clients_add_takes_name_and_optional_handle() {
    let cli = Cli::try_parse_from(["xopt-cli", "clients", "add", "--name", "山田商店"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Clients {
            command: ClientsCommands::Add { ref name, handle: None }
        }) if name == "山田商店"
    ));

    let cli = Cli::try_parse_from([
        "xopt-cli", "clients", "add", "--name", "山田", "--handle", "@yamada",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Clients {
            command: ClientsCommands::Add { handle: Some(ref h), .. }
        }) if h == "@yamada"
    ));
}

#[test]
fn clients_add_requires_name() {
    assert!(Cli::try_parse_from(["xopt-cli", "clients", "add"]).is_err());
}

#[test]
fn clients_select_parses_uuid() {
    let id = Uuid::new_v4();
    let arg = id.to_string();
    let cli = Cli::try_parse_from(["xopt-cli", "clients", "select", arg.as_str()]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Clients {
            command: ClientsCommands::Select { id: parsed }
        }) if parsed == id
    ));

    assert!(Cli::try_parse_from(["xopt-cli", "clients", "select", "not-a-uuid"]).is_err());
}

#[test]
fn clients_current_and_clear() {
    let cli = Cli::try_parse_from(["xopt-cli", "clients", "current"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Clients {
            command: ClientsCommands::Current
        })
    ));
    let cli = Cli::try_parse_from(["xopt-cli", "clients", "clear"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Clients {
            command: ClientsCommands::Clear
        })
    ));
}

#[test]
fn logs_list_defaults_client_and_month() {
    let cli = Cli::try_parse_from(["xopt-cli", "logs", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Logs {
            command: LogsCommands::List {
                client: None,
                month: None
            }
        })
    ));
}

#[test]
fn report_parses_month() {
    let cli = Cli::try_parse_from(["xopt-cli", "report", "--month", "2025-04"]).unwrap();
    let expected: YearMonth = "2025-04".parse().expect("month");
    assert!(matches!(
        cli.command,
        Some(Commands::Report {
            client: None,
            month: Some(m)
        }) if m == expected
    ));
}

#[test]
fn report_rejects_bad_month() {
    assert!(Cli::try_parse_from(["xopt-cli", "report", "--month", "2025-13"]).is_err());
    assert!(Cli::try_parse_from(["xopt-cli", "report", "--month", "April"]).is_err());
}
