//! Integration tests for Job-Ripple

mod crawl_tests;
