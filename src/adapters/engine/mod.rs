pub mod sequoia_engine;
