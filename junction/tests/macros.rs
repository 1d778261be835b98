use std::sync::Arc;

use junction::{Component, Container, Key, View, Wired, interface};

#[interface]
trait Logger: Send + Sync {
    fn name(&self) -> &'static str;
}

#[interface]
trait Sink: Send + Sync {
    fn write(&self, line: &str) -> String;
}

#[interface]
trait Handler: Send + Sync {
    fn id(&self) -> u32;
}

#[derive(Default, Component)]
#[singleton]
#[export(dyn Logger, dyn Sink)]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn name(&self) -> &'static str {
        "console"
    }
}

impl Sink for ConsoleLogger {
    fn write(&self, line: &str) -> String {
        format!("console: {line}")
    }
}

#[derive(Default, Component)]
#[export(dyn Handler)]
struct GetHandler {
    #[import]
    logger: Wired<Arc<dyn Logger>>,
}

impl Handler for GetHandler {
    fn id(&self) -> u32 {
        1
    }
}

#[derive(Default, Component)]
#[export(dyn Handler)]
struct PutHandler {
    #[import(dyn Sink)]
    sink: Wired<Arc<dyn Sink>>,
}

impl Handler for PutHandler {
    fn id(&self) -> u32 {
        2
    }
}

#[derive(Default, Component)]
struct Router {
    #[import_many]
    handlers: Wired<Box<[Arc<dyn Handler>]>>,
    #[import_many(dyn Handler)]
    view: Wired<View<dyn Handler>>,
    #[allow(unused)]
    requests: u64,
}

#[derive(Default, Component)]
struct Server {
    #[embed]
    router: Router,
    #[import]
    logger: Wired<Arc<dyn Logger>>,
}

fn container() -> Container {
    let container = Container::new();
    container.register::<ConsoleLogger>().unwrap();
    container.register::<GetHandler>().unwrap();
    container.register::<PutHandler>().unwrap();
    container
}

#[test]
fn test_derived_exports() {
    let container = container();

    let logger = container.resolve_one::<dyn Logger>().unwrap();
    let sink = container.resolve_one::<dyn Sink>().unwrap();
    assert_eq!(logger.name(), "console");
    assert_eq!(sink.write("ok"), "console: ok");

    let logger = container.resolve(&Key::interface::<dyn Logger>()).unwrap();
    let sink = container.resolve(&Key::interface::<dyn Sink>()).unwrap();
    assert!(Arc::ptr_eq(logger.instance(), sink.instance()));
}

#[test]
fn test_derived_imports() {
    let container = container();

    let resolved = container.resolve_many(&Key::interface::<dyn Handler>()).unwrap();
    assert_eq!(resolved.len(), 2);

    let get = resolved[0].instance().clone().downcast::<GetHandler>().unwrap();
    let put = resolved[1].instance().clone().downcast::<PutHandler>().unwrap();
    assert_eq!(get.logger.get().unwrap().name(), "console");
    assert_eq!(put.sink.get().unwrap().write("x"), "console: x");
}

#[test]
fn test_derived_import_many() {
    let container = container();
    let router = Router::default();
    container.wire_fields(&router).unwrap();

    let ids: Vec<u32> = router.handlers.get().unwrap().iter().map(|h| h.id()).collect();
    assert_eq!(ids, [1, 2]);
    let ids: Vec<u32> = router.view.get().unwrap().iter().map(|h| h.id()).collect();
    assert_eq!(ids, [1, 2]);
}

#[test]
fn test_derived_embed() {
    let container = container();
    let server = Server::default();
    container.wire_fields(&server).unwrap();

    assert_eq!(server.logger.get().unwrap().name(), "console");
    assert_eq!(server.router.handlers.get().unwrap().len(), 2);
    assert_eq!(server.router.view.get().unwrap().len(), 2);
}

#[test]
fn test_derived_descriptor_without_registration() {
    let container = Container::new();
    let router = Router::default();
    assert!(matches!(
        container.wire_fields(&router),
        Err(junction::Error::UnknownCapability { .. })
    ));
    assert!(!router.handlers.is_set());
}
