use super::*;

#[test]
fn test_parse_build() {
    let cli = Cli::try_parse_from(["ds", "build", "--force"]).unwrap();
    match cli.command {
        Commands::Build(args) => assert!(args.force),
        other => panic!("expected build, got {other:?}"),
    }
}

#[test]
fn test_parse_update_with_selection() {
    let cli = Cli::try_parse_from([
        "ds",
        "update",
        "--profiles-only",
        "--select",
        "+dim_customers",
        "--exclude",
        "stg_legacy",
        "--exclude",
        "tag:deprecated",
    ])
    .unwrap();
    match cli.command {
        Commands::Update(args) => {
            assert!(args.profiles_only);
            assert_eq!(args.select.as_deref(), Some("+dim_customers"));
            assert_eq!(args.exclude, vec!["stg_legacy", "tag:deprecated"]);
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[test]
fn test_global_args() {
    let cli = Cli::try_parse_from(["ds", "-v", "-p", "/proj", "ls"]).unwrap();
    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, "/proj");
}

#[test]
fn test_missing_subcommand_is_error() {
    assert!(Cli::try_parse_from(["ds"]).is_err());
}
