// src/services/qr.rs

use std::path::PathBuf;

use image::Luma;
use qrcode::QrCode;

use crate::common::error::AppError;

// Tamanho mínimo da imagem gerada (px)
const QR_MIN_SIZE: u32 = 250;

/// Gera as imagens QR das lojas num diretório.
#[derive(Debug, Clone)]
pub struct QrRenderer {
    dir: PathBuf,
}

impl QrRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Renderiza `content` como PNG em `<dir>/<name>.png` e devolve o caminho.
    pub async fn render_qr(&self, content: &str, name: &str) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(format!("{name}.png"));
        let content = content.to_owned();
        let target = path.clone();

        // Renderizar e codificar PNG é trabalho de CPU: fora do executor
        tokio::task::spawn_blocking(move || -> Result<(), AppError> {
            let code = QrCode::new(content.as_bytes())
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

            code.render::<Luma<u8>>()
                .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
                .build()
                .save(&target)
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de geração do QR: {}", e))??;

        Ok(path.to_string_lossy().into_owned())
    }

    pub async fn remove(&self, path: &str) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(qr = %path, "Falha ao remover QR: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn renders_png_under_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = QrRenderer::new(dir.path().join("qr"));

        let path = renderer
            .render_qr("https://rutas.app/stores/123", "store_123")
            .await
            .unwrap();

        assert!(path.ends_with("store_123.png"));
        let (width, height) = image::image_dimensions(&path).unwrap();
        assert!(width >= QR_MIN_SIZE);
        assert!(height >= QR_MIN_SIZE);

        renderer.remove(&path).await;
        assert!(!std::path::Path::new(&path).exists());
    }
}
