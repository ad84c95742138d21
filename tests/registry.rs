use std::convert::Infallible;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use parking_lot::RwLock;
use vitals::messages::{RpcDistribution, RpcRange, RpcValue};
use vitals::{Bucketer, Collector, Distribution, Metric, RegisterError, Unit, Value};

struct PathCollector(Vec<String>);

impl Collector for PathCollector {
    type Error = Infallible;

    fn collect(&mut self, metric: &Metric) -> Result<(), Infallible> {
        self.0.push(metric.abs_path());
        Ok(())
    }
}

struct FailingCollector;

impl Collector for FailingCollector {
    type Error = &'static str;

    fn collect(&mut self, _metric: &Metric) -> Result<(), &'static str> {
        Err("callback error")
    }
}

fn names(dir: &vitals::Directory) -> Vec<String> {
    dir.list().iter().map(|entry| entry.name().to_owned()).collect()
}

fn paths_under(dir: &vitals::Directory, path: &str) -> Vec<String> {
    let mut collector = PathCollector(Vec::new());
    dir.get_all_metrics_by_path(path, &mut collector).unwrap();
    collector.0
}

// The tests in this file share the process-wide root, so each sticks to its
// own top-level prefix.

#[test]
fn full_lifecycle() {
    let start_time = Arc::new(RwLock::new(0i64));
    let temperature = Arc::new(RwLock::new(0.0f64));
    let app_name = Arc::new(RwLock::new(String::new()));
    let app_args = Arc::new(RwLock::new(String::new()));
    let some_time = Arc::new(RwLock::new(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()));
    let some_time_ptr = Arc::new(RwLock::new(None));
    let some_bool = Arc::new(RwLock::new(false));

    let rpc_bucketer = Bucketer::exponential(6, 10.0, 2.5);
    let rpc_distribution = Arc::new(Distribution::new(&rpc_bucketer));

    vitals::register_metric(
        "/proc/rpc-latency",
        Value::from_distribution(&rpc_distribution),
        Unit::Millisecond,
        "RPC latency",
    )
    .unwrap();
    vitals::register_metric(
        "/proc/rpc-count",
        Value::from_fn(|| 500u64),
        Unit::None,
        "RPC count",
    )
    .unwrap();
    vitals::register_metric(
        "/proc/start-time",
        Value::from_shared(&start_time),
        Unit::Second,
        "Start Time",
    )
    .unwrap();
    vitals::register_metric(
        "/proc/some-time",
        Value::from_shared(&some_time),
        Unit::None,
        "Some time",
    )
    .unwrap();
    vitals::register_metric(
        "/proc/some-time-ptr",
        Value::from_optional_time(&some_time_ptr),
        Unit::None,
        "Some time pointer",
    )
    .unwrap();
    vitals::register_metric(
        "/proc/temperature",
        Value::from_shared(&temperature),
        Unit::Celsius,
        "Temperature",
    )
    .unwrap();
    vitals::register_metric(
        "/appname",
        Value::from_shared(&app_name),
        Unit::None,
        "Name of app",
    )
    .unwrap();
    vitals::register_metric(
        "/appargs",
        Value::from_shared(&app_args),
        Unit::None,
        "Args passed to app",
    )
    .unwrap();

    let foo_dir = vitals::register_directory("proc/foo").unwrap();
    let bar_dir = foo_dir.register_directory("bar").unwrap();
    bar_dir
        .register_metric("baz", Value::from_fn(|| 12.375f32), Unit::None, "A callback float")
        .unwrap();
    bar_dir
        .register_metric("abool", Value::from_shared(&some_bool), Unit::None, "A boolean value")
        .unwrap();
    bar_dir
        .register_metric(
            "anotherBool",
            Value::from_fn(|| false),
            Unit::None,
            "A boolean callback value",
        )
        .unwrap();

    // A directory cannot become a metric.
    assert_eq!(
        vitals::register_metric("/proc/foo/bar", Value::from_fn(|| 0u64), Unit::None, "bad"),
        Err(RegisterError::PathInUse)
    );
    // A metric cannot be overwritten.
    assert_eq!(
        vitals::register_metric("proc/foo/bar/baz", Value::from_fn(|| 0u64), Unit::None, "bad"),
        Err(RegisterError::PathInUse)
    );
    // A metric cannot become a directory.
    assert_eq!(foo_dir.register_directory("/bar/baz"), Err(RegisterError::PathInUse));
    // The empty path cannot hold a metric.
    assert_eq!(
        vitals::register_metric("/", Value::from_fn(|| 0u64), Unit::None, "bad"),
        Err(RegisterError::PathInUse)
    );
    // A metric cannot be an ancestor.
    assert_eq!(
        vitals::register_metric("/appargs/illegal", Value::from_fn(|| 0u64), Unit::None, "bad"),
        Err(RegisterError::PathInUse)
    );

    // Re-registering an existing directory is idempotent and returns the
    // same directory.
    assert_eq!(vitals::register_directory("/proc/foo").unwrap(), foo_dir);

    // Publish actual values. No registry calls are needed to make them
    // visible.
    *app_name.write() = "My application".to_owned();
    *app_args.write() = "--help".to_owned();
    *start_time.write() = -1234567;
    *temperature.write() = 22.5;
    *some_bool.write() = true;
    *some_time.write() = Utc.with_ymd_and_hms(2015, 11, 15, 13, 26, 53).unwrap()
        + chrono::Duration::nanoseconds(7_265_341);

    for i in 0..500 {
        rpc_distribution.add(i as f64);
    }

    let root = vitals::root();
    let proc_dir = root.get_directory("proc").unwrap();
    assert_eq!(
        names(&proc_dir),
        ["foo", "rpc-count", "rpc-latency", "some-time", "some-time-ptr", "start-time", "temperature"]
    );
    assert_eq!(names(&root.get_directory("proc/foo/bar").unwrap()), ["abool", "anotherBool", "baz"]);

    assert_eq!(paths_under(&proc_dir, "foo/bar/baz"), ["/proc/foo/bar/baz"]);
    assert!(paths_under(&proc_dir, "ddd").is_empty());
    assert_eq!(
        paths_under(root, "proc"),
        [
            "/proc/foo/bar/abool",
            "/proc/foo/bar/anotherBool",
            "/proc/foo/bar/baz",
            "/proc/rpc-count",
            "/proc/rpc-latency",
            "/proc/some-time",
            "/proc/some-time-ptr",
            "/proc/start-time",
            "/proc/temperature",
        ]
    );

    // The first collector error aborts the traversal and comes back
    // unchanged.
    assert_eq!(
        root.get_all_metrics_by_path("/proc/foo", &mut FailingCollector),
        Err("callback error")
    );

    // Paths that do not exist.
    assert!(root.get_directory("/appargs/foo").is_none());
    assert!(root.get_metric("/appargs/foo").is_none());
    assert!(root.get_directory("/big/small/little").is_none());
    assert!(root.get_metric("/big/small/little").is_none());
    assert!(root.get_directory("/proc/big/small").is_none());
    assert!(root.get_metric("/proc/big/small").is_none());
    assert!(root.get_metric("/").is_none());

    // /appargs
    let args_metric = root.get_metric("/appargs").unwrap();
    assert_eq!(args_metric.description(), "Args passed to app");
    assert_eq!(args_metric.unit(), Unit::None);
    assert_eq!(args_metric.value().as_rpc_value(), RpcValue::String("--help".to_owned()));
    assert_eq!(args_metric.value().as_html_string(), "\"--help\"");

    // /appname
    let name_metric = root.get_metric("/appname").unwrap();
    assert_eq!(name_metric.value().as_rpc_value(), RpcValue::String("My application".to_owned()));
    assert_eq!(name_metric.value().as_html_string(), "\"My application\"");

    // /proc/temperature
    let temperature_metric = root.get_metric("/proc/temperature").unwrap();
    assert_eq!(temperature_metric.unit(), Unit::Celsius);
    assert_eq!(temperature_metric.value().as_rpc_value(), RpcValue::Float(22.5));
    assert_eq!(temperature_metric.value().as_html_string(), "22.5");

    // /proc/start-time
    let start_time_metric = root.get_metric("/proc/start-time").unwrap();
    assert_eq!(start_time_metric.unit(), Unit::Second);
    assert_eq!(start_time_metric.value().as_rpc_value(), RpcValue::Int(-1234567));
    assert_eq!(start_time_metric.value().as_html_string(), "-1234567");

    // /proc/some-time
    let some_time_metric = root.get_metric("/proc/some-time").unwrap();
    assert_eq!(
        some_time_metric.value().as_rpc_value(),
        RpcValue::Time("1447594013.007265341".to_owned())
    );
    assert_eq!(some_time_metric.value().as_html_string(), "2015-11-15T13:26:53.007265341Z");

    // /proc/some-time-ptr reads as the zero time while the handle is absent.
    let some_time_ptr_metric = root.get_metric("/proc/some-time-ptr").unwrap();
    assert_eq!(
        some_time_ptr_metric.value().as_rpc_value(),
        RpcValue::Time("0.000000000".to_owned())
    );
    assert_eq!(some_time_ptr_metric.value().as_html_string(), "0001-01-01T00:00:00Z");

    *some_time_ptr.write() = Some(Utc.with_ymd_and_hms(2015, 9, 6, 5, 26, 35).unwrap());
    assert_eq!(
        some_time_ptr_metric.value().as_rpc_value(),
        RpcValue::Time("1441517195.000000000".to_owned())
    );
    assert_eq!(some_time_ptr_metric.value().as_html_string(), "2015-09-06T05:26:35Z");

    // /proc/rpc-count
    let rpc_count_metric = root.get_metric("/proc/rpc-count").unwrap();
    assert_eq!(rpc_count_metric.value().as_rpc_value(), RpcValue::Uint(500));
    assert_eq!(rpc_count_metric.value().as_html_string(), "500");

    // /proc/foo/bar/baz
    let baz_metric = root.get_metric("proc/foo/bar/baz").unwrap();
    assert_eq!(baz_metric.value().as_rpc_value(), RpcValue::Float(12.375));
    assert_eq!(baz_metric.value().as_html_string(), "12.375");

    // /proc/foo/bar/abool and anotherBool
    let abool_metric = root.get_metric("proc/foo/bar/abool").unwrap();
    assert_eq!(abool_metric.value().as_rpc_value(), RpcValue::Bool(true));
    assert_eq!(abool_metric.value().as_html_string(), "true");

    let another_bool_metric = root.get_metric("proc/foo/bar/anotherBool").unwrap();
    assert_eq!(another_bool_metric.value().as_rpc_value(), RpcValue::Bool(false));
    assert_eq!(another_bool_metric.value().as_html_string(), "false");

    // /proc/rpc-latency
    let latency_metric = root.get_metric("/proc/rpc-latency").unwrap();
    assert_eq!(latency_metric.unit(), Unit::Millisecond);
    let reading = latency_metric.value().as_rpc_value();
    let RpcValue::Dist(summary) = reading else {
        panic!("expected a distribution reading, got {reading:?}");
    };
    assert!(summary.median >= 249.0 && summary.median < 250.0, "median {}", summary.median);
    assert_eq!(
        summary,
        RpcDistribution {
            min: 0.0,
            max: 499.0,
            average: 249.5,
            median: summary.median,
            count: 500,
            ranges: vec![
                RpcRange { lower: None, upper: Some(10.0), count: 10 },
                RpcRange { lower: Some(10.0), upper: Some(25.0), count: 15 },
                RpcRange { lower: Some(25.0), upper: Some(62.5), count: 38 },
                RpcRange { lower: Some(62.5), upper: Some(156.25), count: 94 },
                RpcRange { lower: Some(156.25), upper: Some(390.625), count: 234 },
                RpcRange { lower: Some(390.625), upper: None, count: 109 },
            ],
        }
    );

    // Absolute paths are computed by walking parent links.
    assert_eq!(baz_metric.abs_path(), "/proc/foo/bar/baz");
    assert_eq!(rpc_count_metric.abs_path(), "/proc/rpc-count");
    assert_eq!(foo_dir.abs_path(), "/proc/foo");
    assert_eq!(root.abs_path(), "/");
}

#[test]
fn registration_races_with_traversal() {
    vitals::register_metric("/race/seed", Value::from_fn(|| 1u64), Unit::None, "seed").unwrap();
    let race_dir = vitals::root().get_directory("race").unwrap();

    crossbeam_utils::thread::scope(|s| {
        s.spawn(|_| {
            for i in 0..100 {
                vitals::register_metric(
                    &format!("/race/writer-a/m{i:03}"),
                    Value::from_fn(move || i as u64),
                    Unit::None,
                    "racing metric",
                )
                .unwrap();
            }
        });
        s.spawn(|_| {
            for i in 0..100 {
                vitals::register_metric(
                    &format!("/race/writer-b/m{i:03}"),
                    Value::from_fn(move || i as u64),
                    Unit::None,
                    "racing metric",
                )
                .unwrap();
            }
        });
        s.spawn(|_| {
            for _ in 0..50 {
                let mut collector = PathCollector(Vec::new());
                race_dir.get_all_metrics(&mut collector).unwrap();
                // Whatever prefix of registrations the walk observed, every
                // delivered path resolves and paths arrive sorted.
                assert!(collector.0.windows(2).all(|pair| pair[0] < pair[1]));
                for path in &collector.0 {
                    assert!(vitals::root().get_metric(path).is_some());
                }
            }
        });
    })
    .unwrap();

    let mut collector = PathCollector(Vec::new());
    race_dir.get_all_metrics(&mut collector).unwrap();
    assert_eq!(collector.0.len(), 201);
}

#[test]
fn directory_handles_survive_nested_registration() {
    let outer = vitals::register_directory("/nested/outer").unwrap();
    let inner = outer.register_directory("inner").unwrap();
    inner
        .register_metric("leaf", Value::from_fn(|| 9u64), Unit::Byte, "a nested leaf")
        .unwrap();

    assert_eq!(inner.abs_path(), "/nested/outer/inner");
    let leaf = outer.get_metric("inner/leaf").unwrap();
    assert_eq!(leaf.abs_path(), "/nested/outer/inner/leaf");
    assert_eq!(leaf.unit(), Unit::Byte);
    assert_eq!(leaf.value().as_uint(), 9);

    // The handle observes entries registered through other handles.
    vitals::register_metric("/nested/outer/sibling", Value::from_fn(|| 2u64), Unit::None, "")
        .unwrap();
    assert!(outer.get_metric("sibling").is_some());
}
