#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_canon::cluster::TermRecord;
use tempfile::{TempDir, tempdir};

/// Builds validated term records from `(value, count)` pairs.
pub fn records(pairs: &[(&str, usize)]) -> Vec<TermRecord> {
    pairs
        .iter()
        .map(|(value, count)| TermRecord::observed(*value, *count).expect("valid record"))
        .collect()
}

/// A small export of a training-records table with noisy categorical columns.
pub const TRAINING_CSV: &str = "\
servidor,modalidade,instituicao_promotora,gratuito_ou_pago
Ana,EAD,Instituto Nacional,Gratuito
Bruno,EAD,Instituto Nacional,Pago
Carla,ead,Instit. Nacional de Pesquisas,Gratuito
Davi,Presencial,UFRJ,Pago
Elis,EAD,Instituto Nacional,
Fabio,presencial,UFRJ,Gratuito
Gil,Presencial,D'Ávila Consultoria,Pago
Hugo,Presencial,d'ávila consultoria,Pago
Iara,EAD,D'Ávila Consultoria,Gratuito
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
