use std::cell::Cell;
use std::fs;
use std::path::Path;

use screen_bindgen::format::FormatterError;
use screen_bindgen::{
    generate, GenerationReport, GeneratorConfig, GeneratorError, Phase, PostGenerationFormatter,
    RunMode, SkipReason, SourceProject,
};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURE
// ═══════════════════════════════════════════════════════════════════════════════

struct Fixture {
    _dir: TempDir,
    config: GeneratorConfig,
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

impl Fixture {
    /// Login, MfaBeginEnrollOptions, Consent (no contract) and ResetPassword
    /// (no screen module). With `unmapped`, MfaSms is exported between Login
    /// and MfaBeginEnrollOptions and carries an unmapped utility method.
    fn new(unmapped: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let core = dir.path().join("core");
        let package = dir.path().join("package");

        let mut entry = String::from("export { default as Login } from './login';\n");
        if unmapped {
            entry.push_str("export { default as MfaSms } from './mfa-sms';\n");
        }
        entry.push_str(
            "export { default as MfaBeginEnrollOptions } from './mfa-begin-enroll-options';\n\
             export { default as Consent } from './consent';\n\
             export { ResetPassword } from '../legacy/reset-password';\n\
             export type { LoginOptions } from '../../interfaces/screens/login';\n",
        );
        write(&core, "src/screens/index.ts", &entry);

        write(
            &core,
            "src/models/base-context.ts",
            "export default class BaseContext {\n  branding: BrandingMembers;\n  screen: ScreenMembers;\n}\n",
        );
        write(
            &core,
            "src/screens/login/index.ts",
            r#"import BaseContext from '../../models/base-context';

export default class Login extends BaseContext {
  static screenIdentifier: string = 'login';
  screen: ScreenMembersOnLogin;

  /**
   * Submits the credentials.
   */
  async login(payload: LoginOptions): Promise<void> {}

  /**
   * @utilityFeature
   */
  resendCode(options?: ResendOptions) {
    return null;
  }
}
"#,
        );
        write(
            &core,
            "interfaces/screens/login.ts",
            r#"export interface LoginOptions {
  username: string;
}

export interface LoginMembers {
  screen: ScreenMembersOnLogin;
  login(payload: LoginOptions): Promise<void>;
  resendCode(options?: ResendOptions): ResendControl;
}
"#,
        );

        write(
            &core,
            "src/screens/mfa-begin-enroll-options/index.ts",
            r#"import BaseContext from '../../models/base-context';

export default class MfaBeginEnrollOptions extends BaseContext {
  async continue(payload: CustomOptions): Promise<void> {}
}
"#,
        );
        write(
            &core,
            "interfaces/screens/mfa-begin-enroll-options.ts",
            r#"export interface MfaBeginEnrollOptionsMembers {
  continue(payload: CustomOptions): Promise<void>;
}
"#,
        );

        write(
            &core,
            "src/screens/mfa-sms/index.ts",
            r#"export default class MfaSms {
  async submit(code: string): Promise<void> {}

  /** @utilityFeature */
  startTimer(seconds: number) {}
}
"#,
        );
        write(
            &core,
            "interfaces/screens/mfa-sms.ts",
            r#"export interface MfaSmsMembers {
  submit(code: string): Promise<void>;
  startTimer(seconds: number): void;
}
"#,
        );

        write(&core, "src/screens/consent/index.ts", "export default class Consent {}\n");
        write(&core, "src/legacy/reset-password.ts", "export class ResetPassword {}\n");

        write(
            &core,
            "docs/index.json",
            r#"{
  "kind": 1,
  "name": "core",
  "children": [
    { "kind": 256, "name": "LoginMembers" },
    { "kind": 256, "name": "MfaBeginEnrollOptionsMembers" },
    { "kind": 256, "name": "MfaSmsMembers" },
    { "kind": 128, "name": "Login" }
  ]
}
"#,
        );
        write(
            &package,
            "scripts/generate-sdk/utility-map.json",
            r#"{
  "resendCode": { "name": "useResend", "path": "../utility/resend", "types": ["UseResendOptions"] }
}
"#,
        );

        Self {
            config: GeneratorConfig::new(core, package),
            _dir: dir,
        }
    }

    fn run(&self, formatter: Option<&dyn PostGenerationFormatter>, mode: RunMode) -> GenerationReport {
        let mut project = SourceProject::from_fs();
        generate(&self.config, &mut project, formatter, mode).expect("run completes")
    }

    fn try_run(&self) -> Result<GenerationReport, GeneratorError> {
        let mut project = SourceProject::from_fs();
        generate(&self.config, &mut project, None, RunMode::Write)
    }

    fn output(&self, kebab: &str) -> String {
        fs::read_to_string(self.config.output_file(kebab)).unwrap()
    }

    fn index(&self) -> String {
        fs::read_to_string(self.config.index_file()).unwrap()
    }
}

struct RecordingFormatter {
    calls: Cell<usize>,
    fail: bool,
}

impl RecordingFormatter {
    fn new(fail: bool) -> Self {
        Self {
            calls: Cell::new(0),
            fail,
        }
    }
}

impl PostGenerationFormatter for RecordingFormatter {
    fn format(&self, _package_root: &Path) -> Result<(), FormatterError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            Err(FormatterError::Status {
                command: self.describe(),
                status: "exit status: 2".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        "fake lint".to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn login_screen_scenario() {
    let fixture = Fixture::new(false);
    let formatter = RecordingFormatter::new(false);
    let report = fixture.run(Some(&formatter), RunMode::Write);

    let login = fixture.output("login");
    assert!(login.contains(
        "export const login = (payload: LoginOptions) => withError(instance.login(payload));"
    ));
    assert!(login.contains("export { useResend } from '../utility/resend';"));
    assert!(login
        .contains("import type { LoginMembers, LoginOptions } from '@auth0/auth0-acul-js/login';"));
    assert!(login.contains("import Login from '@auth0/auth0-acul-js/login';"));

    let index = fixture.index();
    let login_lines = index
        .lines()
        .filter(|l| l.contains("'./screens/login'"))
        .count();
    assert_eq!(login_lines, 1);
    assert!(index.contains("export { useLogin } from './screens/login';"));

    assert_eq!(report.diagnostics.error_count(), 0);
    assert_eq!(report.exit_status(), 0);
    assert_eq!(report.phase, Phase::Done);
    assert_eq!(formatter.calls.get(), 1);

    let screen = report.screen("Login").unwrap();
    assert_eq!(screen.instance_properties, vec!["screen", "branding"]);
    assert_eq!(screen.submit_functions, vec!["login"]);
    assert_eq!(screen.utility_exports, vec!["useResend"]);
}

#[test]
fn index_follows_discovery_order() {
    let fixture = Fixture::new(true);
    fixture.run(None, RunMode::Write);

    let index = fixture.index();
    let lines: Vec<&str> = index.lines().collect();
    assert_eq!(lines[0], "// Initialize telemetry FIRST, before any Core SDK imports");
    assert_eq!(lines[1], "import './telemetry';");
    assert_eq!(
        &lines[3..],
        &[
            "export { useLogin } from './screens/login';",
            "export { useMfaSms } from './screens/mfa-sms';",
            "export { useMfaBeginEnrollOptions } from './screens/mfa-begin-enroll-options';",
            "export { useCurrentScreen, useErrors, useAuth0Themes } from './hooks';",
        ]
    );
}

#[test]
fn generation_is_idempotent() {
    let fixture = Fixture::new(false);
    let first = fixture.run(None, RunMode::Write);
    let login = fixture.output("login");
    let index = fixture.index();

    let second = fixture.run(None, RunMode::Write);
    assert_eq!(fixture.output("login"), login);
    assert_eq!(fixture.index(), index);
    assert_eq!(first.output_digest, second.output_digest);
    assert_eq!(first.written, second.written);
}

#[test]
fn emitted_module_is_complete() {
    let fixture = Fixture::new(false);
    fixture.run(None, RunMode::Write);
    let login = fixture.output("login");

    let wrappers = login.lines().filter(|l| l.contains("withError(instance.")).count();
    let reexports = login
        .lines()
        .filter(|l| l.starts_with("export {") && l.contains("'../utility/"))
        .count();
    assert_eq!(wrappers, 1);
    assert_eq!(reexports, 1);

    let type_line = login
        .lines()
        .find(|l| l.starts_with("import type {"))
        .unwrap();
    let names: Vec<&str> = type_line
        .trim_start_matches("import type {")
        .split('}')
        .next()
        .unwrap()
        .split(',')
        .map(str::trim)
        .collect();
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), names.len());
    for primitive in ["any", "string", "number", "boolean", "undefined", "void", "null"] {
        assert!(!names.contains(&primitive));
    }
}

#[test]
fn reserved_method_names_are_renamed() {
    let fixture = Fixture::new(false);
    fixture.run(None, RunMode::Write);
    let module = fixture.output("mfa-begin-enroll-options");

    assert!(module.contains(
        "export const continueMethod = (payload: CustomOptions) => withError(instance.continue(payload));"
    ));
    assert!(!module.contains("export const continue "));
}

#[test]
fn unmapped_utility_fails_soft() {
    let fixture = Fixture::new(true);
    let formatter = RecordingFormatter::new(false);
    let report = fixture.run(Some(&formatter), RunMode::Write);

    assert_eq!(report.diagnostics.error_count(), 1);
    assert_eq!(report.diagnostics.unmapped()[0].to_string(), "MfaSms.startTimer");

    let mfa_sms = fixture.output("mfa-sms");
    assert!(mfa_sms.contains("export const submit = (code: string) => withError(instance.submit(code));"));
    assert!(!mfa_sms.contains("startTimer"));

    // Screens after the failing one are still processed.
    assert!(fixture.config.output_file("mfa-begin-enroll-options").is_file());
    assert!(report.screen("MfaBeginEnrollOptions").is_some());

    assert_eq!(report.exit_status(), 1);
    assert_eq!(report.phase, Phase::Failed);
    assert_eq!(formatter.calls.get(), 0);
}

#[test]
fn failing_run_report_serializes_with_camel_case_keys() {
    let fixture = Fixture::new(true);
    let report = fixture.run(None, RunMode::Write);
    assert_eq!(report.screens.len(), 3);
    assert_eq!(report.skipped.len(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("report serializes")).expect("valid json");
    assert_eq!(json["mode"], "write");
    assert_eq!(json["phase"], "failed");
    assert_eq!(json["screens"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["screens"][0]["screenName"], "Login");
    assert_eq!(json["screens"][0]["kebabName"], "login");
    assert_eq!(json["skipped"][0]["screenName"], "Consent");
    assert_eq!(json["skipped"][0]["reason"], "missingContractFile");
    assert_eq!(json["diagnostics"]["unmapped"][0]["screen"], "MfaSms");
    assert_eq!(json["diagnostics"]["unmapped"][0]["method"], "startTimer");
    assert_eq!(json["outputDigest"], report.output_digest.as_str());
    assert_eq!(json["formatterFailed"], false);
}

#[test]
fn formatter_failure_keeps_success_exit() {
    let fixture = Fixture::new(false);
    let formatter = RecordingFormatter::new(true);
    let report = fixture.run(Some(&formatter), RunMode::Write);

    assert_eq!(formatter.calls.get(), 1);
    assert!(report.formatter_failed);
    assert_eq!(report.exit_status(), 0);
    assert_eq!(report.phase, Phase::Done);
    assert!(fixture.config.index_file().is_file());
}

#[test]
fn absent_screens_are_skipped() {
    let fixture = Fixture::new(false);
    let report = fixture.run(None, RunMode::Write);

    let skipped: Vec<(&str, SkipReason)> = report
        .skipped
        .iter()
        .map(|s| (s.screen_name.as_str(), s.reason))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("Consent", SkipReason::MissingContractFile),
            ("ResetPassword", SkipReason::MissingScreenModule),
        ]
    );
    assert!(!fixture.config.output_file("consent").exists());
    assert!(!fixture.index().contains("useConsent"));
    assert_eq!(report.exit_status(), 0);
}

#[test]
fn check_mode_reports_stale_output_without_writing() {
    let fixture = Fixture::new(false);

    let before = fixture.run(None, RunMode::Check);
    assert!(before.written.is_empty());
    assert!(!fixture.config.index_file().exists());
    assert_eq!(before.stale.len(), 3);
    assert_eq!(before.exit_status(), 1);

    fixture.run(None, RunMode::Write);
    let clean = fixture.run(None, RunMode::Check);
    assert!(clean.stale.is_empty());
    assert_eq!(clean.exit_status(), 0);

    let login_path = fixture.config.output_file("login");
    fs::write(&login_path, "// edited by hand\n").unwrap();
    let formatter = RecordingFormatter::new(false);
    let stale = fixture.run(Some(&formatter), RunMode::Check);
    assert_eq!(stale.stale, vec![login_path.clone()]);
    assert_eq!(stale.exit_status(), 1);
    assert_eq!(fs::read_to_string(&login_path).unwrap(), "// edited by hand\n");
    assert_eq!(formatter.calls.get(), 0);
}

#[test]
fn leftover_modules_are_reported() {
    let fixture = Fixture::new(false);
    write(&fixture.config.output_dir(), "old-screen.tsx", "export {};\n");
    write(&fixture.config.output_dir(), "notes.md", "not generated\n");

    let report = fixture.run(None, RunMode::Write);
    assert_eq!(
        report.orphans,
        vec![fixture.config.output_dir().join("old-screen.tsx")]
    );
    assert!(fixture.config.output_dir().join("old-screen.tsx").is_file());
}

#[test]
fn missing_docs_index_places_no_constraints() {
    let fixture = Fixture::new(false);
    fs::remove_file(fixture.config.docs_index()).unwrap();
    let report = fixture.run(None, RunMode::Write);
    assert_eq!(report.screen("Login").unwrap().submit_functions, vec!["login"]);
}

#[test]
fn undocumented_contract_emits_screen_without_methods() {
    let fixture = Fixture::new(false);
    write(
        &fixture.config.core_sdk_root,
        "docs/index.json",
        r#"{ "children": [{ "kind": 256, "name": "LoginMembers" }] }"#,
    );
    let report = fixture.run(None, RunMode::Write);
    let screen = report.screen("MfaBeginEnrollOptions").unwrap();
    assert!(screen.submit_functions.is_empty());
    assert!(!fixture.output("mfa-begin-enroll-options").contains("withError"));
}

#[test]
fn utility_map_problems_are_fatal_and_listed_together() {
    let fixture = Fixture::new(false);
    write(
        &fixture.config.package_root,
        "scripts/generate-sdk/utility-map.json",
        r#"{ "resendCode": { "path": "" }, "poll": 4 }"#,
    );
    match fixture.try_run() {
        Err(GeneratorError::InvalidUtilityMap { problems, .. }) => assert_eq!(problems.len(), 3),
        other => panic!("expected invalid map, got {:?}", other.map(|r| r.phase)),
    }
    assert!(!fixture.config.index_file().exists());

    fs::remove_file(fixture.config.utility_map()).unwrap();
    assert!(matches!(
        fixture.try_run(),
        Err(GeneratorError::MissingUtilityMap(_))
    ));
}

#[test]
fn missing_entry_module_is_fatal() {
    let fixture = Fixture::new(false);
    fs::remove_file(fixture.config.entry_module()).unwrap();
    assert!(matches!(
        fixture.try_run(),
        Err(GeneratorError::MissingEntryModule(_))
    ));
}
