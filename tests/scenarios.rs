use std::io;
use std::thread;
use std::time::Duration;

use handoff::{
    run_pipeline, BoundedQueue, PipelineConfig, PipelineError, QueueError, VecSink, WriterSink,
};

fn collect(count: u64, capacity: usize) -> Vec<u64> {
    let mut sink = VecSink::new();
    run_pipeline(&PipelineConfig::new(count, capacity), &mut sink).unwrap();
    sink.into_values()
}

#[test]
fn test_reference_run() {
    assert_eq!(collect(5, 2), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_empty_run() {
    assert!(collect(0, 2).is_empty());
}

#[test]
fn test_single_slot() {
    assert_eq!(collect(3, 1), vec![0, 1, 2]);
}

#[test]
fn test_reference_config_file_output() {
    let config = PipelineConfig::from_file("pipeline.toml".as_ref()).unwrap();
    let mut sink = WriterSink::new(Vec::new());
    let report = run_pipeline(&config, &mut sink).unwrap();

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec!["Consumed: 0", "Consumed: 1", "Consumed: 2", "Consumed: 3", "Consumed: 4"]
    );
    assert_eq!(report.capacity, 2);
}

#[test]
fn test_append_after_close_is_fatal() {
    let queue = BoundedQueue::new(2).unwrap();
    queue.close();

    let result = thread::scope(|s| s.spawn(|| queue.push(1)).join());
    let payload = result.unwrap_err();
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert!(message.contains("closed queue received an append"));
}

#[test]
fn test_manual_handoff_with_slow_consumer() {
    let queue = BoundedQueue::new(2).unwrap();
    let mut received = Vec::new();

    thread::scope(|s| {
        s.spawn(|| {
            for value in 0..6u64 {
                queue.push(value).unwrap();
                assert!(queue.len() <= 2);
            }
            queue.close();
        });

        while let Some(value) = queue.pop().unwrap() {
            thread::sleep(Duration::from_millis(2));
            received.push(value);
        }
    });

    assert_eq!(received, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(queue.high_water_mark(), 2);
}

#[test]
fn test_cancel_from_outside() {
    let queue = BoundedQueue::<u64>::new(1).unwrap();

    thread::scope(|s| {
        let consumer = s.spawn(|| queue.pop());
        let producer = s.spawn(|| {
            queue.push(0)?;
            queue.push(1)?;
            queue.push(2)
        });

        thread::sleep(Duration::from_millis(20));
        queue.cancel();

        assert_eq!(producer.join().unwrap(), Err(QueueError::Cancelled));
        let popped = consumer.join().unwrap();
        assert!(popped == Ok(Some(0)) || popped == Err(QueueError::Cancelled));
    });
}

#[test]
fn test_sink_error_surfaces() {
    let mut sink = |_: u64| {};
    let ok = run_pipeline(&PipelineConfig::new(4, 2), &mut sink);
    assert!(ok.is_ok());

    struct Broken;
    impl handoff::Sink for Broken {
        fn emit(&mut self, _: u64) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }
    let err = run_pipeline(&PipelineConfig::new(4, 2), &mut Broken).unwrap_err();
    assert!(matches!(err, PipelineError::Io(_)));
}
