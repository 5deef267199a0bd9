// Error handling: nothing here may take the engine down

use file_sorter::{EngineState, Settings, SorterError};
use std::time::Duration;

mod common;

#[tokio::test]
async fn test_empty_paths_are_rejected() {
	let engine = common::fast_engine();

	let result = engine.restart(Settings::new("", "/out")).await;
	match result.unwrap_err() {
		SorterError::ConfigInvalid { field, .. } => assert_eq!(field, "watch_path"),
		other => panic!("Expected ConfigInvalid, got: {other:?}"),
	}
	assert_eq!(engine.state(), EngineState::Stopped);

	let result = engine.restart(Settings::new("/in", " ")).await;
	assert!(matches!(result, Err(SorterError::ConfigInvalid { .. })));
	assert_eq!(engine.state(), EngineState::Stopped);
}

#[tokio::test]
async fn test_unusable_watch_path_fails_to_start() {
	let temp_dir = common::setup_temp_dir();
	let root = common::root_of(&temp_dir);
	let blocker = root.join("in");
	common::create_test_file(&blocker, "a file where a folder should be").unwrap();

	let engine = common::fast_engine();
	let result = engine.restart(Settings::new(&blocker, root.join("out"))).await;

	assert!(matches!(result, Err(SorterError::WatchStartFailure { .. })));
	assert_eq!(engine.state(), EngineState::Stopped);
	assert_eq!(engine.watched_path().await, None);
}

#[tokio::test]
async fn test_invalid_settings_recover_on_next_change() {
	let temp_dir = common::setup_temp_dir();
	let root = common::root_of(&temp_dir);
	let engine = common::fast_engine();

	assert!(engine.apply(Settings::new("", "")).await.is_err());
	assert_eq!(engine.state(), EngineState::Stopped);

	// Re-delivering the same broken settings does not retry
	assert!(!engine.apply(Settings::new("", "")).await.unwrap());

	assert!(engine.apply(common::in_out_settings(&root)).await.unwrap());
	assert_eq!(engine.state(), EngineState::Watching);

	engine.shutdown().await;
}

#[tokio::test]
async fn test_failed_move_does_not_stop_watching() {
	let temp_dir = common::setup_temp_dir();
	let root = common::root_of(&temp_dir);
	let settings = common::in_out_settings(&root);
	let engine = common::fast_engine();
	engine.restart(settings.clone()).await.unwrap();
	common::wait_for_events().await;

	// "Images" exists as a file, so every image move fails
	common::create_test_file(&settings.destination_path.join("Images"), "blocker").unwrap();

	let image = settings.watch_path.join("broken.png");
	let video = settings.watch_path.join("fine.mov");
	common::create_test_file(&image, "pixels").unwrap();
	common::create_test_file(&video, "frames").unwrap();

	let sorted_video = settings.destination_path.join("Videos").join("fine.mov");
	assert!(common::wait_for_path(&sorted_video, Duration::from_secs(10)).await);
	tokio::time::sleep(common::TEST_DELAY).await;

	assert!(image.exists(), "failed file is abandoned in place");
	assert_eq!(engine.state(), EngineState::Watching);

	engine.shutdown().await;
}

#[tokio::test]
async fn test_stop_twice_is_harmless() {
	let temp_dir = common::setup_temp_dir();
	let root = common::root_of(&temp_dir);
	let engine = common::fast_engine();
	engine.restart(common::in_out_settings(&root)).await.unwrap();

	engine.shutdown().await;
	engine.shutdown().await;
	assert_eq!(engine.state(), EngineState::Stopped);
}
