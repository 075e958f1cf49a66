#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::parse::{
        jsdoc_tags_before, parse_module, split_parameter, ExportEntry, ImportedName,
    };

    fn parse(source: &str) -> crate::parse::ModuleSummary {
        parse_module(Path::new("module.ts"), source).expect("module should parse")
    }

    #[test]
    fn test_class_members_and_super_class() {
        let summary = parse(
            r#"
            import BaseScreen from '../../models/base-screen';
            export default class Login extends BaseScreen {
              static screenIdentifier: string = 'login';
              screen: ScreenContext;
              transaction: TransactionContext;

              constructor() { super(); }

              /**
               * Submits the login form.
               */
              async login(payload: LoginOptions): Promise<void> {}

              /**
               * @utilityFeature
               * @example resendCode()
               */
              resendCode() {}

              get isReady(): boolean { return true; }
            }
            "#,
        );

        let class = summary.class("Login").expect("class recorded");
        assert_eq!(class.super_class.as_deref(), Some("BaseScreen"));
        assert_eq!(class.instance_properties, vec!["screen", "transaction"]);

        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["login", "resendCode"]);
        assert!(!class.methods[0].has_tag("utilityFeature"));
        assert!(class.methods[1].has_tag("utilityFeature"));
        assert!(class.methods[1].has_tag("example"));
        assert!(summary.has_default_export());
    }

    #[test]
    fn test_interface_method_signatures() {
        let summary = parse(
            r#"
            export interface LoginMembers extends BaseMembers {
              screen: ScreenMembersOnLogin;
              login(payload: LoginOptions): Promise<void>;
              federatedLogin(payload?: FederatedLoginOptions): Promise<void>;
              pick(...ids: string[]): void;
              readonly onChange: () => void;
            }
            "#,
        );

        let iface = summary.interface("LoginMembers").expect("interface recorded");
        let names: Vec<&str> = iface.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["login", "federatedLogin", "pick"]);

        let login = &iface.methods[0].params[0];
        assert_eq!(login.name, "payload");
        assert_eq!(login.type_text, "LoginOptions");
        assert!(!login.is_optional);

        assert!(iface.methods[1].params[0].is_optional);

        let rest = &iface.methods[2].params[0];
        assert!(rest.is_rest);
        assert_eq!(rest.name, "ids");
        assert_eq!(rest.type_text, "string[]");
    }

    #[test]
    fn test_export_forms() {
        let summary = parse(
            r#"
            import Login from './login';
            import { default as Signup } from './signup';
            import * as all from './all';
            export { default as LoginId } from './login-id';
            export { Login, Signup as SignupScreen };
            export * from './more';
            export * as ns from './ns';
            export const version = '1.0.0';
            "#,
        );

        assert_eq!(summary.imports.len(), 3);
        assert_eq!(summary.imports[0].imported, ImportedName::Default);
        assert_eq!(
            summary.imports[1].imported,
            ImportedName::Named("default".to_string())
        );
        assert_eq!(summary.imports[2].imported, ImportedName::Namespace);

        assert_eq!(
            summary.exports,
            vec![
                ExportEntry::Reexport {
                    exported: "LoginId".to_string(),
                    imported: "default".to_string(),
                    source: "./login-id".to_string(),
                },
                ExportEntry::Local {
                    exported: "Login".to_string(),
                    local: "Login".to_string(),
                },
                ExportEntry::Local {
                    exported: "SignupScreen".to_string(),
                    local: "Signup".to_string(),
                },
                ExportEntry::Star {
                    source: "./more".to_string(),
                },
                ExportEntry::Local {
                    exported: "version".to_string(),
                    local: "version".to_string(),
                },
            ]
        );
        assert!(!summary.has_default_export());
    }

    #[test]
    fn test_default_export_of_identifier() {
        let summary = parse("class Consent {}\nexport default Consent;\n");
        assert!(summary.class("Consent").is_some());
        assert!(summary.has_default_export());
    }

    #[test]
    fn test_syntax_error_is_a_failure() {
        let result = parse_module(Path::new("broken.ts"), "export class {{{ nope");
        let failure = result.expect_err("should fail to parse");
        assert!(!failure.messages.is_empty());
    }

    #[test]
    fn test_split_parameter_forms() {
        let p = split_parameter("options?: LoginOptions");
        assert_eq!(
            (p.name.as_str(), p.type_text.as_str(), p.is_optional, p.is_rest),
            ("options", "LoginOptions", true, false)
        );

        let p = split_parameter("cb: (value: string) => void");
        assert_eq!(p.name, "cb");
        assert_eq!(p.type_text, "(value: string) => void");
        assert!(!p.is_optional);

        let p = split_parameter("payload: { code: string; remember?: boolean }");
        assert_eq!(p.type_text, "{ code: string; remember?: boolean }");

        let p = split_parameter("mode: 'a' | 'b' = 'a'");
        assert_eq!(p.type_text, "'a' | 'b'");
        assert!(p.is_optional);

        let p = split_parameter("retries = 3");
        assert_eq!(p.type_text, "number");
        assert!(p.is_optional);

        let p = split_parameter("label = \"x=y\"");
        assert_eq!(p.type_text, "string");

        let p = split_parameter("...args");
        assert!(p.is_rest);
        assert_eq!(p.type_text, "any[]");

        let p = split_parameter("data");
        assert_eq!(p.type_text, "any");
        assert!(!p.is_optional);
    }

    #[test]
    fn test_jsdoc_tags_only_from_adjacent_block() {
        let source = "/** @utilityFeature */\nconst a = 1;\n// plain\nfoo() {}";
        let offset = source.find("foo").unwrap() as u32;
        assert!(jsdoc_tags_before(source, offset).is_empty());

        let source = "/** a */ /* b */\nfoo() {}";
        let offset = source.find("foo").unwrap() as u32;
        assert!(jsdoc_tags_before(source, offset).is_empty());

        let source = "/**\n * Docs.\n * @utilityFeature\n * @param x the value\n */\n  foo() {}";
        let offset = source.find("foo").unwrap() as u32;
        assert_eq!(
            jsdoc_tags_before(source, offset),
            vec!["utilityFeature".to_string(), "param".to_string()]
        );
    }
}
