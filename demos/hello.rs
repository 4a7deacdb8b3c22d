//! Bootstrapping a small service with the graph
//!
//! Run with:
//!   cargo run --example hello
//!   cargo run --example hello --features logging-pretty

use inject_graph::prelude::*;

trait Token: Send + Sync {
    fn username(&self) -> &str;
}

trait TokenService: Send + Sync {
    fn token_by_username(&self, username: &str) -> Box<dyn Token>;
}

struct OAuthToken {
    username: String,
}

impl Token for OAuthToken {
    fn username(&self) -> &str {
        &self.username
    }
}

#[derive(Clone, Default)]
struct OAuthTokenService;

impl TokenService for OAuthTokenService {
    fn token_by_username(&self, username: &str) -> Box<dyn Token> {
        Box::new(OAuthToken {
            username: username.to_owned(),
        })
    }
}

impl Injectable for OAuthTokenService {
    fn describe(d: &mut Descriptor<Self>) {
        d.implements::<dyn TokenService>(|s| s as Shared<dyn TokenService>);
    }
}

#[derive(Clone, Default)]
struct HelloService {
    token_provider: Option<Shared<dyn TokenService>>,
    url: Option<String>,
}

impl Injectable for HelloService {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("token_provider", |s| &s.token_provider, |s| &mut s.token_provider)
            .named_field("url", "helloservice.url", |s| &s.url, |s| &mut s.url);
    }
}

impl HelloService {
    fn greet(&self, username: &str) -> Option<String> {
        let tokens = self.token_provider.as_ref()?;
        let token = tokens.read().token_by_username(username);
        let url = self.url.as_deref()?;
        Some(format!("GET {url} as {}", token.username()))
    }
}

fn main() {
    #[cfg(feature = "logging")]
    inject_graph::logging::init();

    let hello = shared(HelloService::default());

    let mut graph = Graph::new();
    graph
        .provide(
            ValueProvider::new(String::from("https://www.example.org/hello"))
                .named("helloservice.url"),
        )
        .provide(BuilderProvider::new(|| shared(OAuthTokenService)).singleton())
        .provide(ValueProvider::new(Arc::clone(&hello)));

    if let Err(err) = graph.resolve() {
        eprintln!("failed to assemble services: {err}");
        std::process::exit(1);
    }

    match hello.read().greet("gopher") {
        Some(line) => println!("{line}"),
        None => eprintln!("hello service is incomplete"),
    }
}
