//! PNG export of the rendered chart
//!
//! Export is fire-and-forget: `request_export` never reports back to the
//! caller, failures are logged and dropped. Native builds rasterize with
//! `resvg` and write a file; browser builds draw the SVG onto a canvas and
//! trigger a download.

use crate::{ChartDimensions, RateChartConfig, RateChartLayout};
use ab_state::ChartSnapshot;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Name of the downloaded image
pub const EXPORT_FILE_NAME: &str = "ab-chart.png";

/// Export failures
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("chart SVG could not be parsed: {0}")]
    Svg(String),

    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("browser API failed: {0}")]
    Browser(String),
}

/// Export configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Target directory (native builds only)
    pub directory: PathBuf,
    pub file_name: String,
    /// Device pixels per chart unit
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_name: EXPORT_FILE_NAME.to_string(),
            scale: 2.0,
        }
    }
}

impl ExportConfig {
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale.max(0.1);
        self
    }

    pub fn target_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Output size in pixels for a chart of `dims`
    pub fn pixel_size(&self, dims: &ChartDimensions) -> (u32, u32) {
        let scale = f64::from(self.scale);
        (
            (dims.width * scale).ceil().max(1.0) as u32,
            (dims.height * scale).ceil().max(1.0) as u32,
        )
    }
}

/// Lay out the snapshot and export it without waiting for the result
pub fn export_snapshot(snapshot: &ChartSnapshot<'_>, chart: &RateChartConfig, config: &ExportConfig) {
    let layout = RateChartLayout::compute(snapshot, chart);
    request_export(layout.to_svg(), layout.dims, config.clone());
}

// ============================================================================
// NATIVE
// ============================================================================

/// Rasterize an SVG document to PNG bytes
#[cfg(not(target_arch = "wasm32"))]
pub fn rasterize_png(svg: &str, scale: f32) -> Result<Vec<u8>, ExportError> {
    use resvg::{tiny_skia, usvg};

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| ExportError::Svg(e.to_string()))?;
    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Pixmap { width, height })?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap.encode_png().map_err(|e| ExportError::Encode(e.to_string()))
}

/// Rasterize and write the PNG, returning the written path
#[cfg(not(target_arch = "wasm32"))]
pub fn export_png(svg: &str, config: &ExportConfig) -> Result<PathBuf, ExportError> {
    let bytes = rasterize_png(svg, config.scale)?;
    std::fs::create_dir_all(&config.directory).map_err(|source| ExportError::Io {
        path: config.directory.clone(),
        source,
    })?;

    let path = config.target_path();
    std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn request_export(svg: String, _dims: ChartDimensions, config: ExportConfig) {
    match export_png(&svg, &config) {
        Ok(path) => info!(path = %path.display(), "Chart exported"),
        Err(e) => warn!(error = %e, "Chart export failed"),
    }
}

// ============================================================================
// BROWSER
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub fn request_export(svg: String, dims: ChartDimensions, config: ExportConfig) {
    wasm_bindgen_futures::spawn_local(async move {
        match export_in_browser(&svg, &dims, &config).await {
            Ok(()) => info!(file = %config.file_name, "Chart exported"),
            Err(e) => warn!(error = %e, "Chart export failed"),
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn browser<E>(what: &'static str) -> impl FnOnce(E) -> ExportError {
    move |_| ExportError::Browser(what.to_string())
}

#[cfg(target_arch = "wasm32")]
async fn export_in_browser(
    svg: &str,
    dims: &ChartDimensions,
    config: &ExportConfig,
) -> Result<(), ExportError> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement,
        HtmlImageElement, Url,
    };

    let opts = BlobPropertyBag::new();
    opts.set_type("image/svg+xml");
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(svg));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)
        .map_err(browser("unable to build SVG blob"))?;
    let url = Url::create_object_url_with_blob(&blob).map_err(browser("unable to create SVG URL"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ExportError::Browser("document unavailable".into()))?;

    let (width, height) = config.pixel_size(dims);
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(browser("unable to create canvas"))?
        .dyn_into()
        .map_err(browser("canvas cast failed"))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(browser("canvas context unavailable"))?
        .ok_or_else(|| ExportError::Browser("canvas context missing".into()))?
        .dyn_into()
        .map_err(browser("context cast failed"))?;
    let scale = f64::from(config.scale);
    context.scale(scale, scale).map_err(browser("unable to scale canvas"))?;

    let image = HtmlImageElement::new().map_err(browser("unable to create image"))?;
    image.set_src(&url);
    let decoded = JsFuture::from(image.decode()).await;
    let _ = Url::revoke_object_url(&url);
    decoded.map_err(browser("image decode failed"))?;

    context
        .draw_image_with_html_image_element(&image, 0.0, 0.0)
        .map_err(browser("unable to draw image"))?;
    let data_url = canvas
        .to_data_url_with_type("image/png")
        .map_err(browser("unable to serialise canvas"))?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(browser("unable to create anchor"))?
        .dyn_into()
        .map_err(browser("anchor cast failed"))?;
    anchor.set_href(&data_url);
    anchor.set_download(&config.file_name);

    let body = document
        .body()
        .ok_or_else(|| ExportError::Browser("missing body".into()))?;
    body.append_child(&anchor).map_err(browser("unable to attach anchor"))?;
    anchor.click();
    anchor.remove();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_export_config_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.file_name, "ab-chart.png");
        assert_eq!(config.target_path(), PathBuf::from("./ab-chart.png"));
        assert_eq!(config.pixel_size(&ChartDimensions::new(800.0, 420.0)), (1600, 840));
        assert_eq!(ExportConfig::default().with_scale(0.0).scale, 0.1);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_rasterize_png() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20" fill="#4D96FF"/></svg>"##;
        let png = rasterize_png(svg, 1.0).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_rasterize_rejects_garbage() {
        assert!(matches!(rasterize_png("not svg", 1.0), Err(ExportError::Svg(_))));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_export_png_writes_file() {
        let dir = std::env::temp_dir().join(format!("ab-charts-export-{}", std::process::id()));
        let config = ExportConfig::default().with_directory(&dir).with_scale(1.0);
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="red"/></svg>"#;

        let path = export_png(svg, &config).unwrap();
        assert_eq!(path, dir.join("ab-chart.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
