//! A mock implementation of [`QueryFactory`].

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use broker_sql::{Metadata, Query};
use broker_types::ResultSet;
use parking_lot::Mutex;

use crate::{MetadataQuery, MetricQuery, QueryContext, QueryError, QueryFactory};

#[derive(Debug, Clone, PartialEq)]
pub enum MockQueryFactoryCall {
    Metric { ctx: QueryContext, statement: Query },
    Metadata { ctx: QueryContext, statement: Metadata },
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<MockQueryFactoryCall>,
    metric_return: VecDeque<Result<ResultSet, QueryError>>,
    metadata_return: VecDeque<Result<Vec<String>, QueryError>>,
}

/// Hands out query handles that resolve to the queued results, in order.
///
/// An exhausted queue resolves to an empty result.
#[derive(Debug, Default)]
pub struct MockQueryFactory(Mutex<Inner>);

impl MockQueryFactory {
    pub fn with_metric_return(
        self,
        ret: impl Into<VecDeque<Result<ResultSet, QueryError>>>,
    ) -> Self {
        self.0.lock().metric_return = ret.into();
        self
    }

    pub fn with_metadata_return(
        self,
        ret: impl Into<VecDeque<Result<Vec<String>, QueryError>>>,
    ) -> Self {
        self.0.lock().metadata_return = ret.into();
        self
    }

    pub fn calls(&self) -> Vec<MockQueryFactoryCall> {
        self.0.lock().calls.clone()
    }
}

impl QueryFactory for Arc<MockQueryFactory> {
    fn new_metric_query(&self, ctx: QueryContext, statement: &Query) -> Box<dyn MetricQuery> {
        let mut guard = self.0.lock();
        guard.calls.push(MockQueryFactoryCall::Metric {
            ctx,
            statement: statement.clone(),
        });
        Box::new(MockMetricQuery(Some(
            guard
                .metric_return
                .pop_front()
                .unwrap_or_else(|| Ok(ResultSet::default())),
        )))
    }

    fn new_metadata_query(
        &self,
        ctx: QueryContext,
        statement: &Metadata,
    ) -> Box<dyn MetadataQuery> {
        let mut guard = self.0.lock();
        guard.calls.push(MockQueryFactoryCall::Metadata {
            ctx,
            statement: statement.clone(),
        });
        Box::new(MockMetadataQuery(Some(
            guard
                .metadata_return
                .pop_front()
                .unwrap_or_else(|| Ok(vec![])),
        )))
    }
}

#[derive(Debug)]
struct MockMetricQuery(Option<Result<ResultSet, QueryError>>);

#[async_trait]
impl MetricQuery for MockMetricQuery {
    async fn wait_response(&mut self) -> Result<ResultSet, QueryError> {
        self.0.take().unwrap_or_else(|| {
            Err(QueryError::Execution(anyhow::anyhow!(
                "response already taken"
            )))
        })
    }
}

#[derive(Debug)]
struct MockMetadataQuery(Option<Result<Vec<String>, QueryError>>);

#[async_trait]
impl MetadataQuery for MockMetadataQuery {
    async fn wait_response(&mut self) -> Result<Vec<String>, QueryError> {
        self.0.take().unwrap_or_else(|| {
            Err(QueryError::Execution(anyhow::anyhow!(
                "response already taken"
            )))
        })
    }
}
