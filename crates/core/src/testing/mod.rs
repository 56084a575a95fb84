//! Mock collaborators and fixtures for tests.
//!
//! The mocks implement the collaborator traits with controllable results and
//! record calls for assertions, so the pipeline can be exercised end to end
//! without network or disk.

pub mod fixtures;
mod mock_directory;
mod mock_scanner;
mod mock_sink;
mod mock_tracker;

pub use mock_directory::MockDirectory;
pub use mock_scanner::MockScanClient;
pub use mock_sink::MockLogSink;
pub use mock_tracker::MockTracker;
