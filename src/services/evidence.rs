// src/services/evidence.rs

use std::{io, path::PathBuf};

use chrono::Utc;
use tokio::{fs, io::AsyncWriteExt};

// Tentativas de nome novo quando o arquivo já existe
const MAX_NAME_ATTEMPTS: i64 = 16;

/// Guarda as fotos das visitas num diretório raiz.
#[derive(Debug, Clone)]
pub struct EvidenceStorage {
    root: PathBuf,
}

impl EvidenceStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Grava a foto e devolve o caminho que vai no campo `photo` da visita.
    pub async fn store(
        &self,
        agent_name: &str,
        store_name: &str,
        original_name: &str,
        content: &[u8],
    ) -> io::Result<String> {
        fs::create_dir_all(&self.root).await?;

        let store = sanitize_name(store_name);
        let agent = sanitize_name(agent_name);
        let original = original_file_name(original_name);
        let base = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = format!("store_{store}_{agent}_{}_{original}", base + attempt);
            let path = self.root.join(file_name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };

            if let Err(e) = write_all(&mut file, content).await {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(e);
            }

            return Ok(path.to_string_lossy().into_owned());
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "não foi possível gerar um nome livre para a evidência",
        ))
    }

    /// Remove uma evidência gravada. Arquivo já ausente não é erro.
    pub async fn remove(&self, reference: &str) {
        match fs::remove_file(reference).await {
            Ok(()) => tracing::info!(photo = %reference, "Evidência removida"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(photo = %reference, "Falha ao remover evidência: {}", e),
        }
    }
}

async fn write_all(file: &mut fs::File, content: &[u8]) -> io::Result<()> {
    file.write_all(content).await?;
    file.sync_all().await
}

/// Apara as pontas, troca espaços internos por `_` e qualquer caractere
/// fora de `[alfanumérico . - _]` por `_`.
pub fn sanitize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// Só o último componente do caminho enviado pelo cliente
fn original_file_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let name = sanitize_name(last);
    if name.is_empty() || name.chars().all(|c| c == '.') {
        "photo".to_string()
    } else {
        name
    }
}
