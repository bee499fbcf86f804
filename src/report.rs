// SPDX-License-Identifier: MIT

//! Report emitter: Markdown and PDF artifacts from a report bundle
//!
//! The two artifacts are independent: PDF support is probed once at
//! construction (a loadable TTF font family) and when it is missing only
//! the Markdown artifact is produced.

use chrono::Local;
use genpdf::{elements, fonts, style, Alignment, Element as _, SimplePageDecorator};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::{DaylogError, Result};

/// Raster image extensions accepted for report embedding
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp"];

/// Font family expected under the fonts directory for PDF output
const FONT_NAME: &str = "LiberationSans";

/// Embedded image display bounds, inches at the probe DPI
const IMAGE_MAX_WIDTH_IN: f64 = 4.0;
const IMAGE_MAX_HEIGHT_IN: f64 = 3.0;

/// An image staged into the report's images subfolder
#[derive(Debug, Clone)]
pub struct CopiedImage {
    pub original_path: PathBuf,
    pub dest_path: PathBuf,
    pub relative_path: String,
    pub file_name: String,
    pub original_name: String,
}

/// Paths of the written artifacts
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Handles generation of Markdown and PDF reports
pub struct ReportGenerator {
    reports_dir: PathBuf,
    fonts_dir: PathBuf,
    pdf_support: bool,
}

impl ReportGenerator {
    /// Create a generator rooted at `reports_dir`
    pub fn new(reports_dir: &Path, fonts_dir: &Path) -> Result<Self> {
        fs::create_dir_all(reports_dir)?;

        let pdf_support = fonts::from_files(fonts_dir, FONT_NAME, None).is_ok();
        if !pdf_support {
            warn!(
                "No {} font family in {:?}, PDF generation disabled",
                FONT_NAME, fonts_dir
            );
        }

        Ok(Self {
            reports_dir: reports_dir.to_path_buf(),
            fonts_dir: fonts_dir.to_path_buf(),
            pdf_support,
        })
    }

    /// Whether the paginated-document renderer is available
    pub fn pdf_supported(&self) -> bool {
        self.pdf_support
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Generate the single-version report pair
    pub fn generate_report(
        &self,
        notes: &str,
        images: &[PathBuf],
        summary: &str,
        name: &str,
    ) -> Result<ReportPaths> {
        let name = sanitize_name(name);
        info!("Generating report: {}", name);

        let copied = self.copy_images(images, &name);
        let markdown = self.write_markdown(notes, None, &copied, summary, &name)?;
        let pdf = self.write_pdf(notes, None, &copied, summary, &name)?;

        Ok(ReportPaths { markdown, pdf })
    }

    /// Generate the dual-version (original + detailed) report pair
    pub fn generate_detailed_report(
        &self,
        original_notes: &str,
        detailed_notes: &str,
        images: &[PathBuf],
        summary: &str,
        name: &str,
    ) -> Result<ReportPaths> {
        let name = sanitize_name(name);
        info!("Generating detailed report: {}", name);

        let copied = self.copy_images(images, &name);
        let markdown =
            self.write_markdown(original_notes, Some(detailed_notes), &copied, summary, &name)?;
        let pdf = self.write_pdf(original_notes, Some(detailed_notes), &copied, summary, &name)?;

        Ok(ReportPaths { markdown, pdf })
    }

    /// Stage source images into `images/{name}/image_NN.{ext}`.
    ///
    /// A copy failure drops that image from the bundle; it never aborts
    /// the report. No subfolder is created when there are no images.
    pub fn copy_images(&self, image_paths: &[PathBuf], name: &str) -> Vec<CopiedImage> {
        let name = sanitize_name(name);
        let mut copied = Vec::new();

        if image_paths.is_empty() {
            return copied;
        }

        let report_images_dir = self.reports_dir.join("images").join(&name);
        if let Err(e) = fs::create_dir_all(&report_images_dir) {
            error!("Failed to create images folder {:?}: {}", report_images_dir, e);
            return copied;
        }

        for (i, src) in image_paths.iter().enumerate() {
            let ext = src.extension().and_then(|e| e.to_str()).unwrap_or("");
            let file_name = if ext.is_empty() {
                format!("image_{:02}", i + 1)
            } else {
                format!("image_{:02}.{}", i + 1, ext)
            };
            let dest = report_images_dir.join(&file_name);

            match fs::copy(src, &dest) {
                Ok(_) => {
                    info!("Copied image: {:?} -> {:?}", src, dest);
                    copied.push(CopiedImage {
                        original_path: src.clone(),
                        dest_path: dest,
                        relative_path: format!("images/{}/{}", name, file_name),
                        file_name,
                        original_name: src
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| "unknown".to_string()),
                    });
                }
                Err(e) => {
                    error!("Error copying image {:?}: {}", src, e);
                }
            }
        }

        copied
    }

    fn write_markdown(
        &self,
        notes: &str,
        detailed: Option<&str>,
        images: &[CopiedImage],
        summary: &str,
        name: &str,
    ) -> Result<PathBuf> {
        let timestamp = Local::now();
        let date = timestamp.format("%Y-%m-%d");
        let time = timestamp.format("%H:%M");

        let mut content = String::new();

        if detailed.is_some() {
            content.push_str(&format!("# {} {}\n\n", name, date));
        } else {
            content.push_str(&format!("# Daily Log – {}\n\n", date));
        }
        content.push_str(&format!("*Generated on {} at {}*\n\n", date, time));

        let notes_heading = if detailed.is_some() {
            "Original Notes"
        } else {
            "Key Activities"
        };
        content.push_str(&format!("## {}\n\n", notes_heading));
        content.push_str(&format_notes_markdown(notes));
        content.push_str("\n\n");

        if let Some(detailed_text) = detailed {
            content.push_str("## Detailed Documentation\n\n");
            content.push_str(detailed_text);
            content.push_str("\n\n");
        }

        if !images.is_empty() {
            content.push_str("## Images\n\n");
            for img in images {
                content.push_str(&format!("![{}]({})\n\n", img.original_name, img.relative_path));
                content.push_str(&format!("*{}*\n\n", img.original_name));
            }
        }

        content.push_str(&format!("## Summary\n\n{}\n\n---\n\n", summary));
        if detailed.is_some() {
            content.push_str("*Detailed report generated by daylog*\n");
        } else {
            content.push_str("*Report generated by daylog*\n");
        }

        let file_name = if detailed.is_some() {
            format!("{}-detailed.md", name)
        } else {
            format!("{}.md", name)
        };
        let path = self.reports_dir.join(file_name);
        fs::write(&path, content)?;
        info!("Markdown report saved: {:?}", path);

        Ok(path)
    }

    fn write_pdf(
        &self,
        notes: &str,
        detailed: Option<&str>,
        images: &[CopiedImage],
        summary: &str,
        name: &str,
    ) -> Result<Option<PathBuf>> {
        if !self.pdf_support {
            warn!("PDF renderer unavailable, skipping PDF generation");
            return Ok(None);
        }

        let family = match fonts::from_files(&self.fonts_dir, FONT_NAME, None) {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to load PDF fonts: {}, skipping PDF generation", e);
                return Ok(None);
            }
        };

        let heading_style = style::Style::new()
            .bold()
            .with_font_size(14)
            .with_color(style::Color::Rgb(59, 66, 82));
        let caption_style = style::Style::new()
            .italic()
            .with_font_size(9)
            .with_color(style::Color::Rgb(120, 120, 120));

        let mut doc = genpdf::Document::new(family);
        doc.set_paper_size(genpdf::PaperSize::A4);
        doc.set_font_size(11);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);

        let timestamp = Local::now();
        let date = timestamp.format("%Y-%m-%d");
        let title = if detailed.is_some() {
            format!("{} {}", name, date)
        } else {
            format!("Daily Log – {}", date)
        };
        doc.set_title(title.clone());

        doc.push(elements::Paragraph::new(title).styled(
            style::Style::new()
                .bold()
                .with_font_size(22)
                .with_color(style::Color::Rgb(46, 52, 64)),
        ));
        doc.push(elements::Break::new(1.0));
        doc.push(
            elements::Paragraph::new(format!("Generated on {} at {}", date, timestamp.format("%H:%M")))
                .styled(style::Style::new().italic()),
        );
        doc.push(elements::Break::new(2.0));

        let notes_heading = if detailed.is_some() {
            "Original Notes"
        } else {
            "Key Activities"
        };
        doc.push(elements::Paragraph::new(notes_heading).styled(heading_style.clone()));
        doc.push(elements::Break::new(1.0));
        for line in format_notes_pdf(notes) {
            match line {
                Some(text) => doc.push(elements::Paragraph::new(text)),
                None => doc.push(elements::Break::new(1.0)),
            }
        }
        doc.push(elements::Break::new(1.0));

        if let Some(detailed_text) = detailed {
            doc.push(elements::Paragraph::new("Detailed Documentation").styled(heading_style.clone()));
            doc.push(elements::Break::new(1.0));
            for line in detailed_text.lines() {
                if line.trim().is_empty() {
                    doc.push(elements::Break::new(1.0));
                } else {
                    doc.push(elements::Paragraph::new(line.to_string()));
                }
            }
            doc.push(elements::Break::new(1.0));
        }

        if !images.is_empty() {
            doc.push(elements::Paragraph::new("Images").styled(heading_style.clone()));
            doc.push(elements::Break::new(1.0));

            for img in images {
                // Per-image failures become a visible caption, never abort
                match embed_image(&img.dest_path) {
                    Ok(element) => {
                        doc.push(element);
                        doc.push(
                            elements::Paragraph::new(img.original_name.clone())
                                .aligned(Alignment::Center)
                                .styled(caption_style.clone()),
                        );
                    }
                    Err(e) => {
                        error!("Error embedding image {:?}: {}", img.dest_path, e);
                        doc.push(
                            elements::Paragraph::new(format!(
                                "Error loading image: {}",
                                img.original_name
                            ))
                            .aligned(Alignment::Center)
                            .styled(caption_style.clone()),
                        );
                    }
                }
                doc.push(elements::Break::new(1.0));
            }
        }

        doc.push(elements::Paragraph::new("Summary").styled(heading_style));
        doc.push(elements::Break::new(1.0));
        for line in summary.lines() {
            if line.trim().is_empty() {
                doc.push(elements::Break::new(1.0));
            } else {
                doc.push(elements::Paragraph::new(line.to_string()));
            }
        }
        doc.push(elements::Break::new(2.0));

        let footer = if detailed.is_some() {
            "Detailed report generated by daylog"
        } else {
            "Report generated by daylog"
        };
        doc.push(
            elements::Paragraph::new(footer)
                .aligned(Alignment::Center)
                .styled(caption_style),
        );

        let file_name = if detailed.is_some() {
            format!("{}-detailed.pdf", name)
        } else {
            format!("{}.pdf", name)
        };
        let path = self.reports_dir.join(file_name);

        doc.render_to_file(&path)
            .map_err(|e| DaylogError::Pdf(e.to_string()))?;
        info!("PDF report saved: {:?}", path);

        Ok(Some(path))
    }
}

/// Build an image element scaled into the fixed display bounds
fn embed_image(path: &Path) -> Result<elements::Image> {
    let (width, height) = image::image_dimensions(path)?;

    // Pick the DPI that fits both bounds (higher DPI renders smaller)
    let dpi_w = f64::from(width) / IMAGE_MAX_WIDTH_IN;
    let dpi_h = f64::from(height) / IMAGE_MAX_HEIGHT_IN;
    let dpi = dpi_w.max(dpi_h).max(1.0);

    let element = elements::Image::from_path(path)
        .map_err(|e| DaylogError::Pdf(e.to_string()))?
        .with_alignment(Alignment::Center)
        .with_dpi(dpi);

    Ok(element)
}

/// Normalize every non-empty line to a single `- ` list marker; blank lines
/// stay blank (paragraph breaks in Markdown)
fn format_notes_markdown(notes: &str) -> String {
    let mut formatted = Vec::new();

    for line in notes.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            formatted.push(String::new());
            continue;
        }

        formatted.push(normalize_bullet(line, "- "));
    }

    formatted.join("\n")
}

/// Bullet-normalize for the PDF: `Some(line)` for content, `None` for an
/// explicit line break
fn format_notes_pdf(notes: &str) -> Vec<Option<String>> {
    notes
        .trim()
        .lines()
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(normalize_bullet(line, "• "))
            }
        })
        .collect()
}

/// Report names become path segments; separators are flattened so the
/// artifacts stay inside the reports directory
fn sanitize_name(name: &str) -> String {
    name.trim().replace(['/', '\\'], "-")
}

/// Replace a pre-existing bullet glyph (or add one) with the canonical marker
fn normalize_bullet(line: &str, marker: &str) -> String {
    if line.starts_with('•') || line.starts_with('-') || line.starts_with('*') {
        if line.starts_with(marker) {
            line.to_string()
        } else {
            let mut chars = line.chars();
            chars.next();
            format!("{}{}", marker, chars.as_str().trim())
        }
    } else {
        format!("{}{}", marker, line)
    }
}
