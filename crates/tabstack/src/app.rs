use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("tabstack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Group OS windows into tab stacks that share one frame and one tab bar")
        .long_about("tabstack keeps tab groups of independently owned windows consistent while the window server reports asynchronous events. The CLI replays scripted scenarios against an in-memory window server and inspects configuration and live windows.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("replay")
                .about("Replay a scripted scenario and print the resulting groups")
                .arg(
                    Arg::new("script")
                        .help("Path to the JSON scenario script")
                        .required(true)
                        .index(1)
                )
                .arg(
                    Arg::new("events")
                        .long("events")
                        .help("Also print every event the coordinator emitted")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("config")
                .about("Show the effective configuration after merging all config files")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("windows")
                .about("List on-screen windows as the window server reports them (macOS only)")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "tabstack");
    }

    #[test]
    fn test_cli_replay_command() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["tabstack", "replay", "scenario.json", "--json"]);
        assert!(matches.is_ok());

        let matches = matches.unwrap();
        let replay_matches = matches.subcommand_matches("replay").unwrap();
        assert_eq!(
            replay_matches.get_one::<String>("script").unwrap(),
            "scenario.json"
        );
        assert!(replay_matches.get_flag("json"));
        assert!(!replay_matches.get_flag("events"));
    }

    #[test]
    fn test_cli_replay_requires_script() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["tabstack", "replay"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_is_global() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["tabstack", "config", "-v"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        assert!(matches.subcommand_matches("config").is_some());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["tabstack"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_windows_json_flag() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["tabstack", "windows", "--json"])
            .unwrap();
        let windows_matches = matches.subcommand_matches("windows").unwrap();
        assert!(windows_matches.get_flag("json"));
    }
}
