use std::{sync::LazyLock, time::Duration};

use regex::Regex;
use tracing::instrument;

use crate::{diagram::encode, domain::RenderConfig, site::escape};

/// Matches the opening tag of an SVG root element.
static SVG_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<svg[\s>/]").expect("static regex is valid"));

/// A response from the rendering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response body.
    pub body: String,
}

/// Errors raised while talking to the rendering service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No response arrived within the timeout.
    #[error("request timed out")]
    Timeout,
    /// The service could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else {
            Self::Other(error.to_string())
        }
    }
}

/// Issues a single GET request.
///
/// Implementations own their timeout. They must not retry.
pub trait Transport: Send + Sync {
    /// Fetches `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if no complete response could be obtained.
    fn get(&self, url: &str) -> Result<Response, TransportError>;
}

/// A blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Wraps a preconfigured client.
    #[must_use]
    pub const fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Response, TransportError> {
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(Response { status, body })
    }
}

/// Why a diagram was published as text instead of an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackReason {
    /// There was nothing to render.
    #[error("diagram source is empty")]
    EmptySource,
    /// Rendering is switched off.
    #[error("rendering is disabled")]
    Disabled,
    /// The service answered with a status other than 200.
    #[error("renderer responded with status {0}")]
    Status(u16),
    /// The service answered 200, but not with an SVG image.
    #[error("renderer response contains no SVG image")]
    NotSvg,
    /// The request failed.
    #[error("request failed: {0}")]
    Transport(#[from] TransportError),
}

/// The result of rendering one diagram.
///
/// Rendering cannot fail: every failure is captured as a fallback that still
/// carries the diagram source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    /// The service produced an image.
    Rendered {
        /// The SVG markup.
        svg: String,
    },
    /// The diagram could not be rendered.
    Fallback {
        /// The original diagram source.
        source: String,
        /// Why rendering failed.
        reason: FallbackReason,
    },
}

impl RenderResult {
    /// Whether the service produced an image.
    #[must_use]
    pub const fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    /// The markup to embed in a page.
    ///
    /// A fallback shows the source verbatim, a pointer to the interactive
    /// editor at `editor_url`, and the reason rendering failed.
    #[must_use]
    pub fn to_markup(&self, editor_url: &str) -> String {
        match self {
            Self::Rendered { svg } => svg.clone(),
            Self::Fallback { source, reason } => format!(
                "<div class='puml-fallback'><h4>PlantUML Diagram (Text View)</h4>\
                 <pre>{}</pre>\
                 <p>Unable to render. Copy to <a href='{}' target='_blank'>PlantUML Online \
                 Editor</a> to visualize.</p>\
                 <p class='puml-reason'>Reason: {}</p></div>",
                escape(source),
                escape(editor_url),
                escape(&reason.to_string()),
            ),
        }
    }
}

/// Client for a PlantUML rendering service.
///
/// Each call to [`RenderClient::render`] makes at most one request.
#[derive(Debug, Clone)]
pub struct RenderClient<T = HttpTransport> {
    transport: T,
    server: String,
    enabled: bool,
}

impl RenderClient<HttpTransport> {
    /// Creates an HTTP client from the render settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn from_config(config: &RenderConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::new(transport, config.server.clone()).enabled(config.enabled))
    }
}

impl<T: Transport> RenderClient<T> {
    /// Creates a client sending requests for `server` through `transport`.
    ///
    /// `server` is the base URL the token is appended to, such as
    /// `https://www.plantuml.com/plantuml/svg/`.
    pub fn new(transport: T, server: impl Into<String>) -> Self {
        Self {
            transport,
            server: server.into(),
            enabled: true,
        }
    }

    /// Switches requests on or off.
    ///
    /// A disabled client publishes every diagram as text.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The request URL for `source`. The token is a path segment.
    #[must_use]
    pub fn url(&self, source: &str) -> String {
        let token = encode(source);
        if self.server.ends_with('/') {
            format!("{}{token}", self.server)
        } else {
            format!("{}/{token}", self.server)
        }
    }

    /// Renders `source` as SVG.
    ///
    /// Success needs a 200 status and a body containing an `<svg>` element.
    /// Anything else, including transport errors, gives
    /// [`RenderResult::Fallback`].
    #[instrument(level = "debug", skip_all)]
    pub fn render(&self, source: &str) -> RenderResult {
        let fallback = |reason: FallbackReason| {
            tracing::warn!("PlantUML render fallback: {reason}");
            RenderResult::Fallback {
                source: source.to_string(),
                reason,
            }
        };

        if source.trim().is_empty() {
            return fallback(FallbackReason::EmptySource);
        }
        if !self.enabled {
            return fallback(FallbackReason::Disabled);
        }

        let url = self.url(source);
        tracing::debug!(%url, "requesting diagram");

        match self.transport.get(&url) {
            Ok(Response { status: 200, body }) if SVG_ROOT.is_match(&body) => {
                RenderResult::Rendered { svg: body }
            }
            Ok(Response { status: 200, .. }) => fallback(FallbackReason::NotSvg),
            Ok(Response { status, .. }) => fallback(FallbackReason::Status(status)),
            Err(error) => fallback(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::TcpListener,
        sync::Mutex,
        thread,
    };

    use super::*;

    const DIAGRAM: &str = "@startuml\nAlice -> Bob : <<hello>> & bye\n@enduml\n";
    const SVG: &str = r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"><g/></svg>"#;

    struct Stub {
        reply: Result<Response, TransportError>,
        calls: Mutex<Vec<String>>,
    }

    impl Stub {
        fn new(reply: Result<Response, TransportError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok(status: u16, body: &str) -> Self {
            Self::new(Ok(Response {
                status,
                body: body.to_string(),
            }))
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for &Stub {
        fn get(&self, url: &str) -> Result<Response, TransportError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.reply.clone()
        }
    }

    fn client(stub: &Stub) -> RenderClient<&Stub> {
        RenderClient::new(stub, "https://render.example/svg/")
    }

    #[test]
    fn svg_response_is_rendered() {
        let stub = Stub::ok(200, SVG);
        let result = client(&stub).render(DIAGRAM);

        assert_eq!(
            result,
            RenderResult::Rendered {
                svg: SVG.to_string()
            }
        );
        assert_eq!(result.to_markup("https://editor.example"), SVG);
    }

    #[test]
    fn token_is_appended_to_the_path() {
        let stub = Stub::ok(200, SVG);
        client(&stub).render(DIAGRAM);

        let expected = format!("https://render.example/svg/{}", encode(DIAGRAM));
        assert_eq!(stub.calls(), vec![expected]);
    }

    #[test]
    fn separator_is_added_to_bare_server() {
        let stub = Stub::ok(200, SVG);
        let client = RenderClient::new(&stub, "http://localhost:8080/svg");
        assert_eq!(
            client.url("@startuml\n@enduml"),
            format!("http://localhost:8080/svg/{}", encode("@startuml\n@enduml"))
        );
    }

    #[test]
    fn timeout_falls_back_to_source() {
        let stub = Stub::new(Err(TransportError::Timeout));
        let result = client(&stub).render(DIAGRAM);

        assert_eq!(
            result,
            RenderResult::Fallback {
                source: DIAGRAM.to_string(),
                reason: FallbackReason::Transport(TransportError::Timeout),
            }
        );
        assert_eq!(stub.calls().len(), 1);

        let markup = result.to_markup("https://editor.example/uml");
        assert!(markup.contains("PlantUML Diagram (Text View)"));
        assert!(markup.contains("&lt;&lt;hello&gt;&gt; &amp; bye"));
        assert!(markup.contains("https://editor.example/uml"));
        assert!(markup.contains("request timed out"));
    }

    #[test]
    fn error_status_falls_back() {
        let stub = Stub::ok(500, "<html>Internal error</html>");
        let result = client(&stub).render(DIAGRAM);

        assert!(matches!(
            result,
            RenderResult::Fallback {
                reason: FallbackReason::Status(500),
                ..
            }
        ));
        assert!(result.to_markup("e").contains("status 500"));
    }

    #[test]
    fn success_status_without_svg_falls_back() {
        let stub = Stub::ok(200, "<html><body>Syntax error</body></html>");
        let result = client(&stub).render(DIAGRAM);

        assert!(matches!(
            result,
            RenderResult::Fallback {
                reason: FallbackReason::NotSvg,
                ..
            }
        ));
    }

    #[test]
    fn svg_with_other_success_status_falls_back() {
        let stub = Stub::ok(203, SVG);
        assert!(!client(&stub).render(DIAGRAM).is_rendered());
    }

    #[test]
    fn empty_source_makes_no_request() {
        let stub = Stub::ok(200, SVG);
        let result = client(&stub).render("  \n");

        assert!(matches!(
            result,
            RenderResult::Fallback {
                reason: FallbackReason::EmptySource,
                ..
            }
        ));
        assert!(stub.calls().is_empty());
        assert!(!result.to_markup("e").is_empty());
    }

    #[test]
    fn disabled_client_makes_no_request() {
        let stub = Stub::ok(200, SVG);
        let result = client(&stub).enabled(false).render(DIAGRAM);

        assert!(matches!(
            result,
            RenderResult::Fallback {
                reason: FallbackReason::Disabled,
                ..
            }
        ));
        assert!(stub.calls().is_empty());
    }

    /// Serves one connection on a loopback port, replying with `response`
    /// after `delay`.
    fn serve_once(response: &'static str, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buffer = [0; 4096];
            let _ = stream.read(&mut buffer);
            thread::sleep(delay);
            let _ = stream.write_all(response.as_bytes());
        });

        format!("http://{address}/svg/")
    }

    fn http_client(server: String, timeout: Duration) -> RenderClient {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        RenderClient::new(HttpTransport::with_client(client), server)
    }

    #[test]
    fn http_transport_renders_svg() {
        let server = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: image/svg+xml\r\nContent-Length: 42\r\n\
             Connection: close\r\n\r\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>\n",
            Duration::ZERO,
        );

        let result = http_client(server, Duration::from_secs(5)).render(DIAGRAM);

        assert!(result.is_rendered(), "{result:?}");
    }

    #[test]
    fn http_transport_times_out_to_fallback() {
        let server = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Duration::from_secs(3),
        );

        let result = http_client(server, Duration::from_millis(200)).render(DIAGRAM);

        let RenderResult::Fallback { source, reason } = result else {
            panic!("expected a fallback, got {result:?}");
        };
        assert_eq!(source, DIAGRAM);
        assert!(matches!(reason, FallbackReason::Transport(_)), "{reason:?}");
    }

    #[test]
    fn refused_connection_falls_back() {
        let address = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let result =
            http_client(format!("http://{address}/svg/"), Duration::from_secs(2)).render(DIAGRAM);

        assert!(matches!(
            result,
            RenderResult::Fallback {
                reason: FallbackReason::Transport(_),
                ..
            }
        ));
    }
}
