use std::{fs, path::Path};

use chrono::{Local, TimeZone};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tessera::{
    bundle::MissingInputError,
    config::{Config, CssConfig, HtmlConfig, JsConfig},
    js::StripMode,
    orchestrator::{BuildOptions, Orchestrator, Pipeline, Target},
};

const BASE_CSS: &str = "/* base */\nbody {\n  margin : 0 ;\n}\n";
const CARD_CSS: &str = ".card > .title {\n  color: red ! important;\n}\n";
const MAIN_JS: &str = "// entry\nimport { init } from './modules/api.js';\n\ninit(); // start\n";
const API_JS: &str = "/**\n * API\n */\nexport function init() {\n    return fetch(url); // remote\n}\n";
const INDEX_HTML: &str =
    "<!DOCTYPE html>\n<html>\n<!-- nav -->\n<body>\n  <p>Hi</p>\n</body>\n</html>\n";

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn site() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/css/base.css", BASE_CSS);
    write(root, "src/css/card.css", CARD_CSS);
    write(root, "src/main.js", MAIN_JS);
    write(root, "src/modules/api.js", API_JS);
    write(root, "src/index.html", INDEX_HTML);

    let config = Config {
        root: root.to_path_buf(),
        css: CssConfig {
            files: vec!["base.css".to_owned(), "card.css".to_owned()],
            ..CssConfig::default()
        },
        js: JsConfig {
            files: vec!["main.js".to_owned(), "modules/api.js".to_owned()],
            ..JsConfig::default()
        },
        html: HtmlConfig::default(),
        ..Config::default()
    };
    (dir, config)
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn fixed_time() -> chrono::DateTime<Local> {
    Local
        .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
        .single()
        .unwrap()
}

#[test]
fn test_minified_build_writes_every_output() {
    let (dir, config) = site();
    let report = Orchestrator::new(config)
        .run(&[Target::All], &BuildOptions::default())
        .unwrap();

    let root = dir.path();
    assert_eq!(
        read(root, "www/styles.css"),
        "body{margin:0}\n\n.card>.title{color:red!important}\n"
    );
    assert_eq!(
        read(root, "www/main.js"),
        "import { init } from './modules/api.js';\ninit();"
    );
    assert_eq!(
        read(root, "www/modules/api.js"),
        "export function init() {\n    return fetch(url);\n}"
    );
    assert_eq!(
        read(root, "www/index.html"),
        "<!DOCTYPE html> <html> <body> <p>Hi</p> </body> </html>"
    );

    assert_eq!(report.outputs().count(), 4);
    let css = report.get(Pipeline::Css).unwrap();
    assert_eq!(css.totals.files, 2);
    assert_eq!(
        css.totals.original_bytes,
        BASE_CSS.len() + CARD_CSS.len()
    );
    let js = report.get(Pipeline::Js).unwrap();
    assert_eq!(js.files[0].original_lines, 4);
    assert_eq!(js.files[0].processed_lines, 2);
    assert!(js.unterminated.is_empty());
}

#[test]
fn test_unminified_bundle_marks_file_boundaries() {
    let (dir, config) = site();
    Orchestrator::new(config)
        .run(&[Target::Css], &BuildOptions { minify: false })
        .unwrap();

    assert_eq!(
        read(dir.path(), "www/styles.css"),
        format!("/* ===== base.css ===== */\n{BASE_CSS}\n/* ===== card.css ===== */\n{CARD_CSS}")
    );
    assert!(!dir.path().join("www/main.js").exists());
}

#[test]
fn test_unminified_scripts_are_copied() {
    let (dir, config) = site();
    Orchestrator::new(config)
        .run(&[Target::Js], &BuildOptions { minify: false })
        .unwrap();

    assert_eq!(read(dir.path(), "www/modules/api.js"), API_JS);
    assert!(!dir.path().join("www/styles.css").exists());
}

#[test]
fn test_missing_inputs_across_pipelines_abort_the_build() {
    let (dir, mut config) = site();
    config.css.files.insert(1, "gone.css".to_owned());
    config.js.files.push("modules/absent.js".to_owned());
    let root = dir.path().to_path_buf();

    let err = Orchestrator::new(config)
        .run(&[Target::All], &BuildOptions::default())
        .unwrap_err();

    let missing = err.downcast_ref::<MissingInputError>().unwrap();
    assert_eq!(
        missing.paths,
        vec![
            root.join("src/css/gone.css"),
            root.join("src/modules/absent.js"),
        ]
    );
    assert!(!root.join("www").exists());
}

#[test]
fn test_existing_outputs_are_backed_up() {
    let (dir, config) = site();
    let root = dir.path();
    write(root, "www/styles.css", "old{}");
    write(root, "www/modules/api.js", "old();");

    let report = Orchestrator::new(config)
        .with_timestamp(fixed_time())
        .run(&[Target::Css, Target::Js], &BuildOptions::default())
        .unwrap();

    assert_eq!(
        read(root, "src/css/backups/styles.css.backup.20250101-120000"),
        "old{}"
    );
    assert_eq!(
        read(root, "src/modules/modules_api.js.backup.20250101-120000"),
        "old();"
    );
    assert_eq!(report.get(Pipeline::Css).unwrap().backups.len(), 1);
    assert_eq!(report.get(Pipeline::Js).unwrap().backups.len(), 1);
    assert!(!root.join("src/modules/main.js.backup.20250101-120000").exists());
}

#[test]
fn test_backups_can_be_disabled() {
    let (dir, mut config) = site();
    config.backup = false;
    write(dir.path(), "www/styles.css", "old{}");

    let report = Orchestrator::new(config)
        .run(&[Target::Css], &BuildOptions::default())
        .unwrap();

    assert!(report.get(Pipeline::Css).unwrap().backups.is_empty());
    assert!(!dir.path().join("src/css/backups").exists());
}

#[test]
fn test_unterminated_comment_is_reported_not_fatal() {
    let (dir, mut config) = site();
    write(dir.path(), "src/modules/api.js", "export const a = 1;\n/* never closed\nconst b = 2;\n");
    config.js.strip_mode = StripMode::Lexical;

    let report = Orchestrator::new(config)
        .run(&[Target::Js], &BuildOptions::default())
        .unwrap();

    let js = report.get(Pipeline::Js).unwrap();
    assert_eq!(js.unterminated, vec!["modules/api.js".to_owned()]);
    assert_eq!(read(dir.path(), "www/modules/api.js"), "export const a = 1;");
}

#[test]
fn test_license_header_survives_html_minification() {
    let (dir, config) = site();
    let page = "<!-- Licensed under the GNU General Public License -->\n<p>\n  text\n</p>\n";
    write(dir.path(), "src/index.html", page);

    Orchestrator::new(config)
        .run(&[Target::Html], &BuildOptions::default())
        .unwrap();

    insta::assert_snapshot!(
        read(dir.path(), "www/index.html"),
        @"<!-- Licensed under the GNU General Public License --><p> text </p>"
    );
}
