//! Full document builds.
//!
//! A submitted document is written to a fixed file in the work directory and
//! built with external tools into the output directory. The flow for one
//! submission is linear: write source, build and crop the PDF, publish it,
//! convert to SVG, publish that. Any failure stops the flow where it occurs.

mod toolchain;

pub use toolchain::{LatexmkBuilder, Pdf2SvgConverter};

use crate::config::PathsConfig;
use crate::publish::{Published, Publisher};
use crate::utils::{BuildError, ConversionError, Result};
use chrono::{DateTime, TimeZone};
use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Pdf,
    Svg,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Svg => "svg",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Pdf => write!(f, "PDF"),
            ArtifactKind::Svg => write!(f, "SVG"),
        }
    }
}

/// A file produced by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

/// Absolute locations used by one document build.
#[derive(Debug, Clone)]
pub struct Layout {
    work_dir: PathBuf,
    input_name: String,
    out_dir: PathBuf,
}

impl Layout {
    /// `out_dir` is taken relative to `work_dir` unless it is absolute.
    pub fn new(
        work_dir: impl AsRef<Path>,
        input_name: impl Into<String>,
        out_dir: impl AsRef<Path>,
    ) -> io::Result<Self> {
        let work_dir = make_absolute(work_dir.as_ref())?;
        let out_dir = work_dir.join(out_dir);
        Ok(Self {
            work_dir,
            input_name: input_name.into(),
            out_dir,
        })
    }

    pub fn from_config(paths: &PathsConfig) -> io::Result<Self> {
        let out_dir = if paths.per_run_dirs {
            paths.out_dir.join(run_dir_name(&chrono::Local::now()))
        } else {
            paths.out_dir.clone()
        };
        Self::new(&paths.work_dir, paths.input_name.clone(), out_dir)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn tex_path(&self) -> PathBuf {
        self.work_dir.join(&self.input_name)
    }

    fn stem(&self) -> &str {
        Path::new(&self.input_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("tex")
    }

    /// Where the build tools leave the artifact of `kind`.
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.out_dir
            .join(format!("{}.{}", self.stem(), kind.extension()))
    }
}

fn make_absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Name of a per-run output directory started at `time`.
pub fn run_dir_name<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format("%Y%m%d-%H%M%S").to_string()
}

/// Builds a PDF from the source at `layout.tex_path()` into `layout.out_dir()`.
pub trait PdfBuilder {
    fn build(&self, layout: &Layout) -> std::result::Result<PathBuf, BuildError>;
}

pub trait SvgConverter {
    fn convert(&self, pdf: &Path, svg: &Path) -> std::result::Result<(), ConversionError>;
}

/// Requested outputs of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Request {
    pub generate_pdf: bool,
    pub generate_svg: bool,
}

impl Request {
    pub fn is_empty(&self) -> bool {
        !self.generate_pdf && !self.generate_svg
    }
}

/// Overwrites the fixed source file with `source`.
pub fn write_source(layout: &Layout, source: &str) -> std::result::Result<PathBuf, BuildError> {
    let path = layout.tex_path();
    fs::create_dir_all(layout.work_dir())
        .and_then(|_| fs::write(&path, source))
        .map_err(|source| BuildError::Io {
            path: path.clone(),
            source,
        })?;
    log::debug!("Wrote {} bytes to {}", source.len(), path.display());
    Ok(path)
}

fn remove_stale(path: &Path) -> std::result::Result<(), BuildError> {
    match fs::remove_file(path) {
        Ok(()) => {
            log::debug!("Removed previous {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub struct Pipeline<'a> {
    pub layout: &'a Layout,
    pub builder: &'a dyn PdfBuilder,
    pub converter: &'a dyn SvgConverter,
    pub publisher: &'a Publisher,
}

impl Pipeline<'_> {
    /// Writes `source` and produces and publishes the requested artifacts.
    ///
    /// The source file is written even when nothing is requested. Requesting
    /// SVG always builds a fresh PDF first; the PDF itself is published only
    /// when requested.
    pub fn run(&self, source: &str, request: Request) -> Result<Vec<Published>> {
        write_source(self.layout, source)?;
        if request.is_empty() {
            log::info!("No output requested, skipping build");
            return Ok(Vec::new());
        }

        let out_dir = self.layout.out_dir();
        fs::create_dir_all(out_dir).map_err(|source| BuildError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;
        remove_stale(&self.layout.artifact_path(ArtifactKind::Pdf))?;
        if request.generate_svg {
            remove_stale(&self.layout.artifact_path(ArtifactKind::Svg))?;
        }

        let pdf = self.builder.build(self.layout)?;
        let mut published = Vec::new();

        if request.generate_pdf {
            published.push(self.publisher.publish(&Artifact {
                kind: ArtifactKind::Pdf,
                path: pdf.clone(),
            })?);
        }

        if request.generate_svg {
            let svg = self.layout.artifact_path(ArtifactKind::Svg);
            self.converter.convert(&pdf, &svg)?;
            published.push(self.publisher.publish(&Artifact {
                kind: ArtifactKind::Svg,
                path: svg,
            })?);
        }

        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Error, ToolError};
    use chrono::Utc;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Copies the source into the PDF slot, prefixed so content can be traced.
    #[derive(Default)]
    struct FakeBuilder {
        calls: Cell<usize>,
        fail: bool,
    }

    impl PdfBuilder for FakeBuilder {
        fn build(&self, layout: &Layout) -> std::result::Result<PathBuf, BuildError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(BuildError::Build(ToolError::Failed {
                    program: "latexmk".to_string(),
                    status: "exited with code 12".to_string(),
                    diagnostics: "! Missing } inserted.".to_string(),
                }));
            }
            let source = fs::read_to_string(layout.tex_path()).unwrap();
            let pdf = layout.artifact_path(ArtifactKind::Pdf);
            fs::write(&pdf, format!("PDF[{}]", source)).unwrap();
            Ok(pdf)
        }
    }

    #[derive(Default)]
    struct FakeConverter {
        calls: Cell<usize>,
        fail: bool,
    }

    impl SvgConverter for FakeConverter {
        fn convert(&self, pdf: &Path, svg: &Path) -> std::result::Result<(), ConversionError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ConversionError::MissingOutput(svg.to_path_buf()));
            }
            let pdf = fs::read_to_string(pdf).unwrap();
            fs::write(svg, format!("SVG[{}]", pdf)).unwrap();
            Ok(())
        }
    }

    struct Fixture {
        _root: TempDir,
        layout: Layout,
        publish_dir: PathBuf,
        publisher: Publisher,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path().join("work"), "tex.tex", "out").unwrap();
        let publish_dir = root.path().join("Desktop");
        fs::create_dir_all(&publish_dir).unwrap();
        let publisher = Publisher::to_dir(&publish_dir);
        Fixture {
            _root: root,
            layout,
            publish_dir,
            publisher,
        }
    }

    fn request(generate_pdf: bool, generate_svg: bool) -> Request {
        Request {
            generate_pdf,
            generate_svg,
        }
    }

    fn published_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn layout_places_artifacts_under_out_dir() {
        let layout = Layout::new("/work", "tex.tex", "out").unwrap();
        assert_eq!(layout.tex_path(), PathBuf::from("/work/tex.tex"));
        assert_eq!(layout.out_dir(), Path::new("/work/out"));
        assert_eq!(
            layout.artifact_path(ArtifactKind::Pdf),
            PathBuf::from("/work/out/tex.pdf")
        );
        assert_eq!(
            layout.artifact_path(ArtifactKind::Svg),
            PathBuf::from("/work/out/tex.svg")
        );
    }

    #[test]
    fn layout_keeps_absolute_out_dir() {
        let layout = Layout::new("/work", "paper.tex", "/tmp/build").unwrap();
        assert_eq!(
            layout.artifact_path(ArtifactKind::Pdf),
            PathBuf::from("/tmp/build/paper.pdf")
        );
    }

    #[test]
    fn layout_makes_relative_work_dir_absolute() {
        let layout = Layout::new(".", "tex.tex", "out").unwrap();
        assert!(layout.work_dir().is_absolute());
        assert!(layout.out_dir().ends_with("out"));
    }

    #[test]
    fn per_run_layout_adds_timestamp_dir() {
        let paths = PathsConfig {
            work_dir: PathBuf::from("/work"),
            per_run_dirs: true,
            ..PathsConfig::default()
        };
        let layout = Layout::from_config(&paths).unwrap();
        let run_dir = layout.out_dir().file_name().unwrap().to_str().unwrap();
        assert_eq!(run_dir.len(), "20261014-120000".len());
        assert_eq!(layout.out_dir().parent(), Some(Path::new("/work/out")));
    }

    #[test]
    fn run_dir_name_is_sortable_timestamp() {
        let time = Utc.with_ymd_and_hms(2026, 10, 14, 9, 5, 3).unwrap();
        assert_eq!(run_dir_name(&time), "20261014-090503");
    }

    #[test]
    fn no_output_requested_builds_nothing() {
        let fx = fixture();
        let builder = FakeBuilder::default();
        let converter = FakeConverter::default();
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &fx.publisher,
        };

        let published = pipeline.run("\\documentclass{article}", request(false, false)).unwrap();

        assert!(published.is_empty());
        assert_eq!(builder.calls.get(), 0);
        assert_eq!(converter.calls.get(), 0);
        assert!(published_files(&fx.publish_dir).is_empty());
        assert_eq!(
            fs::read_to_string(fx.layout.tex_path()).unwrap(),
            "\\documentclass{article}"
        );
    }

    #[test]
    fn pdf_request_builds_and_publishes_pdf() {
        let fx = fixture();
        let builder = FakeBuilder::default();
        let converter = FakeConverter::default();
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &fx.publisher,
        };

        let published = pipeline.run("doc", request(true, false)).unwrap();

        assert_eq!(builder.calls.get(), 1);
        assert_eq!(converter.calls.get(), 0);
        assert!(fx.layout.artifact_path(ArtifactKind::Pdf).is_file());
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].kind, ArtifactKind::Pdf);
        assert_eq!(published[0].destination, fx.publish_dir.join("tex.pdf"));
        assert!(published[0].notification.starts_with("PDF file generated"));
        assert_eq!(
            fs::read_to_string(fx.publish_dir.join("tex.pdf")).unwrap(),
            "PDF[doc]"
        );
    }

    #[test]
    fn both_requests_publish_pdf_then_svg() {
        let fx = fixture();
        let builder = FakeBuilder::default();
        let converter = FakeConverter::default();
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &fx.publisher,
        };

        let published = pipeline.run("doc", request(true, true)).unwrap();

        let kinds: Vec<ArtifactKind> = published.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ArtifactKind::Pdf, ArtifactKind::Svg]);
        assert_eq!(published_files(&fx.publish_dir), vec!["tex.pdf", "tex.svg"]);
        assert_eq!(
            fs::read_to_string(fx.publish_dir.join("tex.svg")).unwrap(),
            "SVG[PDF[doc]]"
        );
    }

    #[test]
    fn svg_request_builds_fresh_pdf_but_publishes_only_svg() {
        let fx = fixture();
        let builder = FakeBuilder::default();
        let converter = FakeConverter::default();
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &fx.publisher,
        };

        let published = pipeline.run("doc", request(false, true)).unwrap();

        assert_eq!(builder.calls.get(), 1);
        assert_eq!(converter.calls.get(), 1);
        assert_eq!(published.len(), 1);
        assert_eq!(published_files(&fx.publish_dir), vec!["tex.svg"]);
    }

    #[test]
    fn failed_build_publishes_nothing() {
        let fx = fixture();
        let builder = FakeBuilder {
            fail: true,
            ..FakeBuilder::default()
        };
        let converter = FakeConverter::default();
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &fx.publisher,
        };

        let result = pipeline.run("\\begin{document} {", request(true, true));

        assert!(matches!(result, Err(Error::Build(BuildError::Build(_)))));
        assert_eq!(converter.calls.get(), 0);
        assert!(published_files(&fx.publish_dir).is_empty());
    }

    #[test]
    fn failed_build_leaves_no_previous_pdf() {
        let fx = fixture();
        let converter = FakeConverter::default();
        let good = FakeBuilder::default();
        Pipeline {
            layout: &fx.layout,
            builder: &good,
            converter: &converter,
            publisher: &fx.publisher,
        }
        .run("first", request(true, false))
        .unwrap();

        let bad = FakeBuilder {
            fail: true,
            ..FakeBuilder::default()
        };
        let result = Pipeline {
            layout: &fx.layout,
            builder: &bad,
            converter: &converter,
            publisher: &fx.publisher,
        }
        .run("second", request(true, false));

        assert!(result.is_err());
        assert!(!fx.layout.artifact_path(ArtifactKind::Pdf).exists());
    }

    #[test]
    fn failed_conversion_keeps_published_pdf() {
        let fx = fixture();
        let builder = FakeBuilder::default();
        let converter = FakeConverter {
            fail: true,
            ..FakeConverter::default()
        };
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &fx.publisher,
        };

        let result = pipeline.run("doc", request(true, true));

        assert!(matches!(result, Err(Error::Conversion(_))));
        assert_eq!(published_files(&fx.publish_dir), vec!["tex.pdf"]);
    }

    #[test]
    fn second_document_replaces_all_artifacts() {
        let fx = fixture();
        let builder = FakeBuilder::default();
        let converter = FakeConverter::default();
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &fx.publisher,
        };

        pipeline.run("first document", request(true, true)).unwrap();
        pipeline.run("second", request(true, true)).unwrap();

        let tex = fs::read_to_string(fx.layout.tex_path()).unwrap();
        let pdf = fs::read_to_string(fx.layout.artifact_path(ArtifactKind::Pdf)).unwrap();
        let published_pdf = fs::read_to_string(fx.publish_dir.join("tex.pdf")).unwrap();
        let published_svg = fs::read_to_string(fx.publish_dir.join("tex.svg")).unwrap();
        assert_eq!(tex, "second");
        assert_eq!(pdf, "PDF[second]");
        assert_eq!(published_pdf, "PDF[second]");
        assert_eq!(published_svg, "SVG[PDF[second]]");
        for content in [tex, pdf, published_pdf, published_svg] {
            assert!(!content.contains("first"));
        }
    }

    #[test]
    fn publishing_into_out_dir_keeps_built_pdf() {
        let fx = fixture();
        let builder = FakeBuilder::default();
        let converter = FakeConverter::default();
        let publisher = Publisher::to_dir(fx.layout.out_dir());
        fs::create_dir_all(fx.layout.out_dir()).unwrap();
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &publisher,
        };

        let published = pipeline.run("%PDF-1.5 real content", request(true, true)).unwrap();

        assert_eq!(published.len(), 2);
        assert_eq!(
            fs::read_to_string(fx.layout.artifact_path(ArtifactKind::Pdf)).unwrap(),
            "PDF[%PDF-1.5 real content]"
        );
        assert_eq!(
            fs::read_to_string(fx.layout.artifact_path(ArtifactKind::Svg)).unwrap(),
            "SVG[PDF[%PDF-1.5 real content]]"
        );
    }

    #[test]
    fn missing_publish_dir_is_copy_error() {
        let fx = fixture();
        let builder = FakeBuilder::default();
        let converter = FakeConverter::default();
        let publisher = Publisher::to_dir(fx.publish_dir.join("absent"));
        let pipeline = Pipeline {
            layout: &fx.layout,
            builder: &builder,
            converter: &converter,
            publisher: &publisher,
        };

        let result = pipeline.run("doc", request(true, false));

        assert!(matches!(result, Err(Error::Copy(_))));
        assert!(fx.layout.artifact_path(ArtifactKind::Pdf).is_file());
    }
}
