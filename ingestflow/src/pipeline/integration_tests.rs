//! End-to-end runs of the transcript pipeline.

#[cfg(test)]
mod tests {
    use crate::actions::Operation;
    use crate::cancellation::CancellationToken;
    use crate::config::{PipelineConfig, RecordStoreConfig};
    use crate::context::PipelineContext;
    use crate::display::display_action;
    use crate::errors::IngestError;
    use crate::events::CollectingEventSink;
    use crate::pipeline::{Pipeline, StepStatus};
    use crate::records::RecordManager;
    use crate::steps::{AppendTranscriptStep, FetchTranscriptStep};
    use crate::testing::{
        assert_completed, assert_failed, assert_no_entries, assert_pending,
        FailingTranscriptFetcher, SlowTranscriptFetcher, StaticTranscriptFetcher,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    const LINK: &str = "Check this out: https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn pipeline(fetcher: Arc<dyn crate::fetch::TranscriptFetcher>) -> Pipeline {
        Pipeline::transcript(fetcher, &PipelineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_linked_note_gets_transcript() {
        let records = RecordManager::in_memory();
        let fetcher = Arc::new(StaticTranscriptFetcher::new("never gonna give you up"));
        let mut ctx = PipelineContext::new("abc123", LINK, records.clone());

        let report = pipeline(fetcher.clone()).run(&mut ctx).await.unwrap();

        assert_eq!(fetcher.requested(), vec!["dQw4w9WgXcQ".to_string()]);
        assert_eq!(report.completed_steps(), vec!["fetch_transcript", "append_transcript"]);
        assert_completed(&records, "abc123", Operation::FetchTranscript);
        assert_completed(&records, "abc123", Operation::AppendTranscript);
        assert!(ctx.content.starts_with(LINK));
        assert!(ctx.content.ends_with("never gonna give you up\n"));

        let fetch_entries: Vec<_> = records
            .entries("abc123")
            .into_iter()
            .filter(|e| e.action.operation == Operation::FetchTranscript)
            .collect();
        assert_eq!(fetch_entries.len(), 2);
        assert!(fetch_entries.iter().all(|e| e.completed));
    }

    #[tokio::test]
    async fn test_note_without_link_is_untouched() {
        let records = RecordManager::in_memory();
        let fetcher = Arc::new(StaticTranscriptFetcher::new("unused"));
        let mut ctx = PipelineContext::new("xyz789", "No links here.", records.clone());

        let report = pipeline(fetcher.clone()).run(&mut ctx).await.unwrap();

        assert!(report.nothing_to_do());
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(ctx.content, "No links here.");
        assert_no_entries(&records, "xyz789");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_logged_and_returned() {
        let records = RecordManager::in_memory();
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = Pipeline::builder("transcript")
            .step(FetchTranscriptStep::new(Arc::new(FailingTranscriptFetcher::new("network down"))).unwrap())
            .step(AppendTranscriptStep::new())
            .with_event_sink(sink.clone())
            .build()
            .unwrap();
        let mut ctx = PipelineContext::new("abc123", LINK, records.clone());

        let err = pipeline.run(&mut ctx).await.unwrap_err();

        assert!(matches!(err, IngestError::Fetch(ref m) if m == "network down"));
        assert_failed(&records, "abc123", Operation::FetchTranscript, "network down");
        assert!(records.entry("abc123", Operation::FetchTranscript.done()).is_none());
        assert!(records.entry("abc123", Operation::AppendTranscript.start()).is_none());
        assert_eq!(ctx.content, LINK);

        let labels: Vec<_> = records
            .entries("abc123")
            .iter()
            .map(|e| display_action(e.action))
            .collect();
        assert_eq!(
            labels,
            vec!["Fetching YouTube transcript", "Failed to fetch YouTube transcript"]
        );
        assert_eq!(sink.events_of_type("pipeline.failed").len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_after_failure_recovers() {
        let records = RecordManager::in_memory();
        let mut ctx = PipelineContext::new("abc123", LINK, records.clone());
        let _ = pipeline(Arc::new(FailingTranscriptFetcher::new("network down")))
            .run(&mut ctx)
            .await;

        let mut retry = PipelineContext::new("abc123", LINK, records.clone());
        pipeline(Arc::new(StaticTranscriptFetcher::new("words")))
            .run(&mut retry)
            .await
            .unwrap();

        assert_completed(&records, "abc123", Operation::FetchTranscript);
        assert!(records.entry("abc123", Operation::FetchTranscript.error()).is_none());
        assert_eq!(records.entries("abc123").len(), 4);
    }

    #[tokio::test]
    async fn test_failing_rerun_after_success_replaces_outcome() {
        let records = RecordManager::in_memory();
        let mut ctx = PipelineContext::new("abc123", LINK, records.clone());
        pipeline(Arc::new(StaticTranscriptFetcher::new("words")))
            .run(&mut ctx)
            .await
            .unwrap();

        let mut rerun = PipelineContext::new("abc123", LINK, records.clone());
        let err = pipeline(Arc::new(FailingTranscriptFetcher::new("network down")))
            .run(&mut rerun)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "network down");
        assert_failed(&records, "abc123", Operation::FetchTranscript, "network down");
        assert!(records.entry("abc123", Operation::FetchTranscript.done()).is_none());

        let labels: Vec<_> = records
            .entries("abc123")
            .iter()
            .filter(|e| e.action.operation == Operation::FetchTranscript)
            .map(|e| display_action(e.action))
            .collect();
        assert_eq!(
            labels,
            vec!["Fetching YouTube transcript", "Failed to fetch YouTube transcript"]
        );
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out() {
        let records = RecordManager::in_memory();
        let config = PipelineConfig::default().with_step_timeout(Some(0.02));
        let fetcher = Arc::new(SlowTranscriptFetcher::new(Duration::from_secs(5), "late"));
        let pipeline = Pipeline::transcript(fetcher, &config).unwrap();
        let mut ctx = PipelineContext::new("abc123", LINK, records.clone());

        let err = pipeline.run(&mut ctx).await.unwrap_err();

        assert_eq!(err.kind(), "timeout");
        let entry = records.entry("abc123", Operation::FetchTranscript.error()).unwrap();
        assert!(entry.error.unwrap().message.contains("fetch_transcript"));
        assert!(ctx.transcript.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_run_records_error() {
        let records = RecordManager::in_memory();
        let token = Arc::new(CancellationToken::new());
        let fetcher = Arc::new(SlowTranscriptFetcher::new(Duration::from_secs(5), "late"));
        let mut ctx = PipelineContext::new("abc123", LINK, records.clone())
            .with_cancellation(Arc::clone(&token));

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel("shutdown");
        });
        let err = pipeline(fetcher).run(&mut ctx).await.unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err.to_string(), "Pipeline cancelled: shutdown");
        assert_pending(&records, "abc123", Operation::FetchTranscript);
        assert!(records.entry("abc123", Operation::FetchTranscript.error()).is_some());
    }

    #[tokio::test]
    async fn test_batch_mixes_items() {
        let records = RecordManager::in_memory();
        let fetcher = Arc::new(StaticTranscriptFetcher::new("words"));
        let pipeline = Pipeline::transcript(
            fetcher.clone(),
            &PipelineConfig::default().with_max_concurrency(2),
        )
        .unwrap();

        let contexts = vec![
            PipelineContext::new("one", LINK, records.clone()),
            PipelineContext::new("two", "plain note", records.clone()),
            PipelineContext::new("three", "https://youtu.be/abcdefghijk", records.clone()),
        ];
        let outcomes = pipeline.run_batch(contexts).await;

        assert!(outcomes.iter().all(|o| o.is_ok()));
        assert_eq!(fetcher.call_count(), 2);
        assert_completed(&records, "one", Operation::AppendTranscript);
        assert_no_entries(&records, "two");
        assert_completed(&records, "three", Operation::AppendTranscript);

        let report = outcomes[1].result.as_ref().unwrap();
        assert_eq!(report.status_of("fetch_transcript"), Some(StepStatus::Skipped));

        let mut fingerprints = records.fingerprints();
        fingerprints.sort();
        assert_eq!(fingerprints, vec!["one".to_string(), "three".to_string()]);
    }

    #[tokio::test]
    async fn test_json_store_persists_log() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_records(RecordStoreConfig::JsonDir {
            path: dir.path().to_path_buf(),
        });
        let records = config.records.build().unwrap();
        let pipeline = Pipeline::transcript(Arc::new(StaticTranscriptFetcher::new("words")), &config).unwrap();
        let mut ctx = PipelineContext::new("abc123", LINK, records);

        pipeline.run(&mut ctx).await.unwrap();

        let reopened = config.records.build().unwrap();
        assert_completed(&reopened, "abc123", Operation::FetchTranscript);
        assert_completed(&reopened, "abc123", Operation::AppendTranscript);
        assert_eq!(reopened.entries("abc123").len(), 4);
    }
}
