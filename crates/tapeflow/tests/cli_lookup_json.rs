mod cli_support;

use cli_support::{run_cli_with_input, TestEnv};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LookupReport {
    tape_id: String,
    sections: Vec<LookupSection>,
}

#[derive(Debug, Deserialize)]
struct LookupSection {
    location: String,
    rows: Vec<Vec<String>>,
    ambiguous: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Inventory {
    location: String,
    count: usize,
    tapes: Vec<serde_json::Value>,
    unparsed: Vec<Vec<String>>,
}

const HEADER: &str = "Tape ID,Media Type,Last Moved\n";

#[test]
fn test_lookup_reports_only_locations_holding_the_tape() {
    let env = TestEnv::new();
    env.write_sheet("Onsite", &format!("{}11,DAILY,01/01/2026\n", HEADER));
    env.write_sheet("Retired", &format!("{}12,BRMS,03/02/2024\n", HEADER));

    let report: LookupReport = env.run_json(&["lookup", "12", "--json"]);
    assert_eq!(report.tape_id, "12");
    assert_eq!(report.sections.len(), 1);
    assert_eq!(report.sections[0].location, "Retired");
    assert_eq!(
        report.sections[0].rows,
        vec![vec!["12".to_string(), "BRMS".to_string(), "03/02/2024".to_string()]]
    );
    assert!(report.sections[0].ambiguous.is_none());

    let missing: LookupReport = env.run_json(&["lookup", "404", "--json"]);
    assert!(missing.sections.is_empty());

    let output = env.run(&["lookup", "404"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Tape 404 was not found in any location."));
}

#[test]
fn test_list_location_inventory() {
    let env = TestEnv::new();
    env.write_sheet(
        "Offsite",
        &format!("{}21,WEEKLY,05/05/2026\n22,MONTHLY,06/05/2026\n23,HOURLY,07/05/2026\n", HEADER),
    );

    let inventory: Inventory = env.run_json(&["list", "offsite", "--json"]);
    assert_eq!(inventory.location, "Offsite");
    assert_eq!(inventory.count, 3);
    assert_eq!(inventory.tapes.len(), 2);
    assert_eq!(inventory.tapes[0]["media_type"], "WEEKLY");
    assert_eq!(inventory.unparsed, vec![vec!["23", "HOURLY", "07/05/2026"]]);

    let empty: Inventory = env.run_json(&["list", "retired", "--json"]);
    assert_eq!(empty.count, 0);
}

#[test]
fn test_config_reports_store_layout() {
    let env = TestEnv::new();
    env.write_config("[shell]\nexit_countdown_secs = 0\n");

    let config = env.run_json_value(&["config", "--json"]);
    assert_eq!(config["backend"], "csv");
    assert_eq!(config["config_file_exists"], true);
    assert_eq!(config["exit_countdown_secs"], 0);
    assert_eq!(config["store_dir"], env.store_dir().to_string_lossy().to_string());
    let sheets = config["sheets"].as_array().expect("sheets");
    assert_eq!(sheets.len(), 3);
}

#[test]
fn test_malformed_config_is_reported() {
    let env = TestEnv::new();
    env.write_config("[store]\nbackend = \"spreadsheet\"\n");

    let output = env.run(&["config"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid config file"));
}

#[test]
fn test_interactive_menu_over_stdin() {
    let env = TestEnv::new();
    env.write_config("[shell]\nexit_countdown_secs = 0\n");

    let args = env.args(&[]);
    let output = run_cli_with_input(&args, &env.envs(), "2\n300\n3\n1\n300\n6\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TAPE ROTATION MANAGEMENT SYSTEM"));
    assert!(stdout.contains("Tape 300 registered Onsite as WEEKLY"));
    assert!(stdout.contains("Tape 300 moved from Onsite to Offsite"));
    assert!(stdout.trim_end().ends_with("Goodbye."));
    assert!(env.read_sheet("Offsite").contains("300,WEEKLY,"));
}
