use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::TempDir;

#[allow(deprecated)]
fn medplanner(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("medplanner").expect("medplanner binary");
    cmd.env("MEDPLANNER_DATA_DIR", data_dir)
        .env_remove("MEDPLANNER_LOG");
    cmd
}

const SEMESTER_DOCUMENT: &str = r##"{
    "version": "1.3",
    "exportDate": "2024-05-01T12:00:00Z",
    "semestres": [{"id": "11111111-1111-4111-8111-111111111111", "nome": "2024.1",
        "dataInicio": "2024-02-01T00:00:00Z", "dataFim": "2024-06-30T00:00:00Z", "isAtivo": true}],
    "disciplinas": [{"id": "22222222-2222-4222-8222-222222222222", "nome": "Anatomia",
        "sigla": "ANAT", "corHexCode": "#FF0000", "cargaHorariaTotal": 80,
        "semestreId": "11111111-1111-4111-8111-111111111111"}],
    "tarefas": [{"id": "33333333-3333-4333-8333-333333333333", "titulo": "Atlas",
        "descricao": "", "dataEntrega": "2024-03-01T00:00:00Z", "isConcluida": false,
        "disciplinaId": "22222222-2222-4222-8222-222222222222"}],
    "provas": [], "faltas": [], "anotacoes": [],
    "avaliacoes": [{"id": "44444444-4444-4444-8444-444444444444", "titulo": "P1",
        "notaObtida": 8.0, "peso": 1.0, "data": "2024-03-20T00:00:00Z",
        "disciplinaId": "22222222-2222-4222-8222-222222222222"}],
    "professores": [], "feriados": []
}"##;

#[test]
fn cli_init_and_config() {
    let data = TempDir::new().unwrap();

    medplanner(data.path())
        .arg("init")
        .assert()
        .success()
        .stdout(str_contains("Initialization complete!"));

    assert!(data.path().join("config.json").exists());
    assert!(data.path().join("data").join("disciplines.json").exists());

    medplanner(data.path())
        .arg("init")
        .assert()
        .success()
        .stdout(str_contains("already initialized"));

    medplanner(data.path())
        .arg("config")
        .assert()
        .success()
        .stdout(str_contains("Backup retention:     30 daily, 12 monthly"));
}

#[test]
fn cli_import_requires_force() {
    let data = TempDir::new().unwrap();
    let file = data.path().join("in.json");
    std::fs::write(&file, SEMESTER_DOCUMENT).unwrap();

    medplanner(data.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(str_contains("run again with --force"));

    medplanner(data.path())
        .arg("config")
        .assert()
        .success()
        .stdout(str_contains("0 semesters, 0 disciplines"));
}

#[test]
fn cli_import_then_export_round_trip() {
    let data = TempDir::new().unwrap();
    let input = data.path().join("in.json");
    let output = data.path().join("out.json");
    std::fs::write(&input, SEMESTER_DOCUMENT).unwrap();

    medplanner(data.path())
        .args(["import", "--force"])
        .arg(&input)
        .assert()
        .success()
        .stdout(str_contains("1 semesters, 1 disciplines, 1 tasks"));

    medplanner(data.path())
        .arg("export")
        .arg(&output)
        .assert()
        .success()
        .stdout(str_contains("Exported to"));

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(exported["version"], "1.3");
    assert_eq!(
        exported["disciplinas"][0]["semestreId"],
        "11111111-1111-4111-8111-111111111111"
    );
    assert_eq!(
        exported["tarefas"][0]["disciplinaId"],
        "22222222-2222-4222-8222-222222222222"
    );
}

#[test]
fn cli_rejects_malformed_backup() {
    let data = TempDir::new().unwrap();
    let file = data.path().join("broken.json");
    std::fs::write(&file, r#"{"version": "1.3", "exportDate": "2024-05-01T12:00:00Z"}"#).unwrap();

    medplanner(data.path())
        .args(["import", "--force"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(str_contains("Malformed backup"));
}

#[test]
fn cli_inspect_reports_counts() {
    let data = TempDir::new().unwrap();
    let file = data.path().join("in.json");
    std::fs::write(&file, SEMESTER_DOCUMENT).unwrap();

    medplanner(data.path())
        .arg("inspect")
        .arg(&file)
        .assert()
        .success()
        .stdout(str_contains("Format version: 1.3"))
        .stdout(str_contains("Dangling links: 0"))
        .stdout(str_contains("Invalid records: 0"));
}

#[test]
fn cli_reports_after_import() {
    let data = TempDir::new().unwrap();
    let file = data.path().join("in.json");
    std::fs::write(&file, SEMESTER_DOCUMENT).unwrap();

    medplanner(data.path())
        .args(["import", "--force"])
        .arg(&file)
        .assert()
        .success();

    medplanner(data.path())
        .args(["report", "grades", "--all"])
        .assert()
        .success()
        .stdout(str_contains("Anatomia (ANAT)"))
        .stdout(str_contains("Approved"));

    medplanner(data.path())
        .args(["report", "attendance", "--all"])
        .assert()
        .success()
        .stdout(str_contains("20.0h"));
}

#[test]
fn cli_backup_create_and_list() {
    let data = TempDir::new().unwrap();

    medplanner(data.path())
        .args(["backup", "create"])
        .assert()
        .success()
        .stdout(str_contains("Backup created: backup-"));

    medplanner(data.path())
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(str_contains("Total: 1 backup(s)"));

    medplanner(data.path())
        .args(["backup", "info", "latest"])
        .assert()
        .success()
        .stdout(str_contains("Status: Consistent"));
}

#[test]
fn cli_holiday_seed_and_check() {
    let data = TempDir::new().unwrap();

    medplanner(data.path())
        .args(["holiday", "seed", "--year", "2024"])
        .assert()
        .success()
        .stdout(str_contains("Added 10 holiday(s) for 2024"));

    medplanner(data.path())
        .args(["holiday", "check", "2025-12-25"])
        .assert()
        .success()
        .stdout(str_contains("Natal"))
        .stdout(str_contains("no classes"));

    medplanner(data.path())
        .args(["holiday", "check", "not-a-date"])
        .assert()
        .failure();
}
