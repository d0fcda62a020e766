//! Loading shader sources from outside the binary.
//!
//! Native builds read from the `assets/` directory next to the working
//! directory; the web build fetches over HTTP relative to the page document.
//! Both sides answer with a status code so that a missing file and a failed
//! request surface the same way.

use std::future::Future;

use crate::error::DemoError;

pub const DEFAULT_SHADER_DIR: &str = "shaders";
pub const VERTEX_SHADER_FILE: &str = "vertex.glsl";
pub const FRAGMENT_SHADER_FILE: &str = "fragment.glsl";

/// A response from an [`AssetSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub status: u16,
    pub body: String,
}

impl Fetched {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Somewhere text assets can be fetched from.
///
/// Transport failures are errors; a reachable source answering with a bad
/// status is a [`Fetched`] with that status.
pub trait AssetSource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Fetched, DemoError>>;
}

/// Vertex and fragment source text, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl From<ShaderSources> for (String, String) {
    fn from(sources: ShaderSources) -> Self {
        (sources.vertex, sources.fragment)
    }
}

fn shader_path(base_dir: &str, file: &str) -> String {
    let base_dir = base_dir.trim_end_matches('/');
    if base_dir.is_empty() {
        file.to_string()
    } else {
        format!("{base_dir}/{file}")
    }
}

/// Fetches `<base_dir>/vertex.glsl` and `<base_dir>/fragment.glsl`
/// concurrently.
///
/// Fails if either response is not OK; no partial result is returned.
pub async fn load_shaders<S: AssetSource>(
    source: &S,
    base_dir: &str,
) -> Result<ShaderSources, DemoError> {
    let vertex_path = shader_path(base_dir, VERTEX_SHADER_FILE);
    let fragment_path = shader_path(base_dir, FRAGMENT_SHADER_FILE);

    let (vertex, fragment) =
        futures::future::join(source.fetch(&vertex_path), source.fetch(&fragment_path)).await;
    let (vertex, fragment) = (vertex?, fragment?);

    let failed = [(&vertex_path, &vertex), (&fragment_path, &fragment)]
        .into_iter()
        .find(|(_, response)| !response.is_ok());
    if let Some((path, response)) = failed {
        log::error!(
            "shaders loading error: {} -> {}, {} -> {}",
            vertex_path,
            vertex.status,
            fragment_path,
            fragment.status
        );
        return Err(DemoError::ShaderFetch {
            path: path.clone(),
            status: response.status,
        });
    }

    log::info!("Loaded shaders {} and {}", vertex_path, fragment_path);
    Ok(ShaderSources {
        vertex: vertex.body,
        fragment: fragment.body,
    })
}

/// Reads assets from a directory on disk.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileSource {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The copy of `assets/` the build script stages in `OUT_DIR`.
    pub fn staged() -> Self {
        Self::new(std::path::Path::new(env!("OUT_DIR")).join("assets"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for FileSource {
    /// `./assets`, or the staged build copy when the working directory has
    /// none.
    fn default() -> Self {
        let local = std::path::Path::new("./").join("assets");
        if local.is_dir() {
            Self::new(local)
        } else {
            log::debug!("no ./assets, reading the staged build copy");
            Self::staged()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetSource for FileSource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Fetched, DemoError>> {
        let full_path = self.root.join(path);
        async move {
            match std::fs::read_to_string(&full_path) {
                Ok(body) => Ok(Fetched::ok(body)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Fetched::not_found()),
                Err(e) => Err(DemoError::ShaderRead {
                    path: full_path.display().to_string(),
                    reason: e.to_string(),
                }),
            }
        }
    }
}

/// The directory part of a document URL: query and fragment dropped, cut
/// after the last `/` of the path.
///
/// `https://host/demo/index.html?x#y` gives `https://host/demo/`.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn page_directory(document_url: &str) -> String {
    let end = document_url.find(['?', '#']).unwrap_or(document_url.len());
    let url = &document_url[..end];
    let path_start = url.find("://").map_or(0, |i| i + 3);
    match url[path_start..].rfind('/') {
        Some(i) => url[..=path_start + i].to_string(),
        None => format!("{url}/"),
    }
}

/// Fetches assets over HTTP relative to the page that loaded the module.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: reqwest::Url,
}

#[cfg(target_arch = "wasm32")]
impl HttpSource {
    /// Resolves against the document base URL (`<base href>` if set, else
    /// the page URL), so a page under `/demo/` loads `/demo/shaders/..`.
    pub fn from_window() -> Result<Self, DemoError> {
        let unavailable = |what: &str| DemoError::ShaderRead {
            path: String::new(),
            reason: format!("{what} unavailable"),
        };
        let window = web_sys::window().ok_or_else(|| unavailable("window"))?;
        let document_url = match window.document().and_then(|d| d.base_uri().ok().flatten()) {
            Some(base) => base,
            None => window
                .location()
                .href()
                .map_err(|_| unavailable("location href"))?,
        };
        let directory = page_directory(&document_url);
        let base = reqwest::Url::parse(&directory).map_err(|e| DemoError::ShaderRead {
            path: directory.clone(),
            reason: e.to_string(),
        })?;
        log::debug!("fetching assets relative to {base}");
        Ok(Self { base })
    }
}

#[cfg(target_arch = "wasm32")]
impl AssetSource for HttpSource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Fetched, DemoError>> {
        let url = self.base.join(path);
        let path = path.to_string();
        async move {
            let read_error = |reason: String| DemoError::ShaderRead {
                path: path.clone(),
                reason,
            };
            let url = url.map_err(|e| read_error(e.to_string()))?;
            let response = reqwest::get(url).await.map_err(|e| read_error(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| read_error(e.to_string()))?;
            Ok(Fetched { status, body })
        }
    }
}

/// The asset source of the platform the crate is built for.
#[cfg(not(target_arch = "wasm32"))]
pub fn platform_source() -> Result<FileSource, DemoError> {
    Ok(FileSource::default())
}

#[cfg(target_arch = "wasm32")]
pub fn platform_source() -> Result<HttpSource, DemoError> {
    HttpSource::from_window()
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::HashMap,
        pin::Pin,
        task::{Context, Poll},
    };

    use futures::executor::block_on;

    use super::*;

    /// Pending once, then ready; lets the executor interleave fetches.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[derive(Default)]
    struct MemorySource {
        files: HashMap<String, Fetched>,
        log: RefCell<Vec<String>>,
    }

    impl MemorySource {
        fn with(mut self, path: &str, response: Fetched) -> Self {
            self.files.insert(path.to_string(), response);
            self
        }
    }

    impl AssetSource for MemorySource {
        fn fetch(&self, path: &str) -> impl Future<Output = Result<Fetched, DemoError>> {
            async move {
                self.log.borrow_mut().push(format!("start {path}"));
                YieldOnce(false).await;
                self.log.borrow_mut().push(format!("end {path}"));
                Ok(self.files.get(path).cloned().unwrap_or_else(Fetched::not_found))
            }
        }
    }

    fn both_ok() -> MemorySource {
        MemorySource::default()
            .with("shaders/vertex.glsl", Fetched::ok("vertex text"))
            .with("shaders/fragment.glsl", Fetched::ok("fragment text"))
    }

    #[test]
    fn resolves_sources_in_order() {
        let sources = block_on(load_shaders(&both_ok(), DEFAULT_SHADER_DIR)).unwrap();
        let (vertex, fragment): (String, String) = sources.into();
        assert_eq!(vertex, "vertex text");
        assert_eq!(fragment, "fragment text");
    }

    #[test]
    fn fetches_are_in_flight_together() {
        let source = both_ok();
        block_on(load_shaders(&source, "shaders")).unwrap();
        let log = source.log.borrow();
        assert_eq!(log[0], "start shaders/vertex.glsl");
        assert_eq!(log[1], "start shaders/fragment.glsl");
    }

    #[test]
    fn non_ok_fragment_fails_without_partial_result() {
        let source = MemorySource::default()
            .with("shaders/vertex.glsl", Fetched::ok("vertex text"))
            .with(
                "shaders/fragment.glsl",
                Fetched {
                    status: 500,
                    body: "oops".into(),
                },
            );
        match block_on(load_shaders(&source, "shaders")) {
            Err(DemoError::ShaderFetch { path, status }) => {
                assert_eq!(path, "shaders/fragment.glsl");
                assert_eq!(status, 500);
            }
            other => panic!("expected a fetch error, got {other:?}"),
        }
    }

    #[test]
    fn missing_vertex_fails() {
        let source =
            MemorySource::default().with("shaders/fragment.glsl", Fetched::ok("fragment text"));
        let err = block_on(load_shaders(&source, "shaders")).unwrap_err();
        assert!(err.is_shader_error());
        assert!(matches!(err, DemoError::ShaderFetch { status: 404, .. }));
    }

    #[test]
    fn base_dir_is_configurable() {
        let source = MemorySource::default()
            .with("custom/vertex.glsl", Fetched::ok("v"))
            .with("custom/fragment.glsl", Fetched::ok("f"));
        let sources = block_on(load_shaders(&source, "custom/")).unwrap();
        assert_eq!(sources.vertex, "v");
        assert_eq!(sources.fragment, "f");
    }

    #[test]
    fn page_directory_keeps_the_document_path() {
        assert_eq!(
            page_directory("https://host/demo/index.html?x=1#top"),
            "https://host/demo/"
        );
        assert_eq!(page_directory("https://host/demo/"), "https://host/demo/");
        assert_eq!(page_directory("https://host/index.html"), "https://host/");
        assert_eq!(page_directory("http://localhost:8080"), "http://localhost:8080/");
        let vertex = shader_path(DEFAULT_SHADER_DIR, VERTEX_SHADER_FILE);
        let directory = page_directory("https://host/demo/cube.html");
        assert_eq!(format!("{directory}{vertex}"), "https://host/demo/shaders/vertex.glsl");
    }

    #[test]
    fn empty_base_dir_uses_bare_file_names() {
        assert_eq!(shader_path("", VERTEX_SHADER_FILE), "vertex.glsl");
        assert_eq!(shader_path("a/b", FRAGMENT_SHADER_FILE), "a/b/fragment.glsl");
    }
}
