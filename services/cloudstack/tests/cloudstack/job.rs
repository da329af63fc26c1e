// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use stacksign_cloudstack::{Document, ErrorCause, JobOutcome};
use stacksign_core::ErrorKind;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use super::mock::{client, job_response, MockHttpSend};

fn started_job() -> Document {
    Document::parse(
        200,
        Bytes::from_static(
            b"<deployvirtualmachineresponse><id>vm-1</id><jobid>j-1</jobid></deployvirtualmachineresponse>",
        ),
    )
    .expect("must parse")
}

#[tokio::test(start_paused = true)]
async fn test_synchronous_response_is_returned_as_is() -> Result<()> {
    let mock = MockHttpSend::new();
    let doc = Document::parse(200, Bytes::from_static(b"<listzonesresponse/>"))?;

    let result = client(&mock).wait_for_job(&doc, "listZones").await?;
    assert_eq!(result, doc);
    assert!(mock.requests().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_job_succeeds_after_two_pending_polls() -> Result<()> {
    let done = "<queryasyncjobresultresponse><jobid>j-1</jobid><jobstatus>1</jobstatus>\
                <jobresult><virtualmachine><id>vm-1</id><state>Running</state></virtualmachine></jobresult>\
                </queryasyncjobresultresponse>";
    let mock = MockHttpSend::new()
        .respond(200, job_response(0))
        .respond(200, job_response(0))
        .respond(200, done);
    let client = client(&mock);

    let start = Instant::now();
    let result = client
        .wait_for_job(&started_job(), "deployVirtualMachine")
        .await?;

    assert_eq!(result, Document::parse(200, Bytes::from_static(done.as_bytes()))?);
    assert_eq!(result.find_text("state"), Some("Running"));

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    for url in &requests {
        assert!(url.contains("command=queryAsyncJobResult&jobId=j-1&apiKey=AK&signature="));
    }
    // One default interval before each of the three polls.
    assert!(start.elapsed() >= Duration::from_secs(15));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_job_failure_with_structured_error() {
    let mock = MockHttpSend::new().respond(
        200,
        "<queryasyncjobresultresponse><jobid>j-1</jobid><jobstatus>2</jobstatus>\
         <jobresult><errorcode>431</errorcode><errortext>no change</errortext></jobresult>\
         </queryasyncjobresultresponse>",
    );

    let err = client(&mock)
        .wait_for_job_id("j-1", "createSnapshot")
        .await
        .expect_err("failed job must fail");
    assert_eq!(err.kind(), ErrorKind::ServiceError);
    assert_eq!(err.code(), Some(431));
    assert_eq!(err.message(), "no change");
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_job_failure_without_result() {
    let mock = MockHttpSend::new().respond(200, job_response(2));

    let err = client(&mock)
        .wait_for_job(&started_job(), "deployVirtualMachine")
        .await
        .expect_err("failed job must fail");
    assert_eq!(err.code(), Some(530));
    assert_eq!(
        err.message(),
        "deployVirtualMachine failed with an unexplained error"
    );
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_without_change_is_not_modified() -> Result<()> {
    let mock = MockHttpSend::new().respond(
        200,
        "<queryasyncjobresultresponse><jobid>j-1</jobid><jobstatus>2</jobstatus>\
         <jobresult><errorcode>530</errorcode>\
         <errortext>Failed to create snapshot due to an internal error: no change since last snapshot</errortext>\
         </jobresult></queryasyncjobresultresponse>",
    );
    let client = client(&mock);

    let outcome = client
        .job_poller("createSnapshot")
        .wait_outcome(&started_job())
        .await?;
    match outcome {
        JobOutcome::NotModified(err) => {
            assert_eq!(ErrorCause::of(&err), ErrorCause::NotModified);
            assert_eq!(err.code(), Some(530));
        }
        JobOutcome::Completed(doc) => panic!("expected not modified, got {doc:?}"),
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_other_failures_stay_errors_in_outcome() {
    let mock = MockHttpSend::new().respond(200, job_response(2));

    let err = client(&mock)
        .job_poller("createSnapshot")
        .wait_outcome(&started_job())
        .await
        .expect_err("unexplained failure must stay an error");
    assert_eq!(err.kind(), ErrorKind::ServiceError);
}

#[tokio::test(start_paused = true)]
async fn test_custom_interval() -> Result<()> {
    let mock = MockHttpSend::new()
        .respond(200, job_response(0))
        .respond(200, job_response(1));
    let client = client(&mock);

    let start = Instant::now();
    client
        .job_poller("attachVolume")
        .with_interval(Duration::from_secs(1))
        .wait_for_id("j-1")
        .await?;

    assert_eq!(mock.requests().len(), 2);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(5));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_max_wait_gives_up() {
    let mut mock = MockHttpSend::new();
    for _ in 0..10 {
        mock = mock.respond(200, job_response(0));
    }

    let err = client(&mock)
        .job_poller("deployVirtualMachine")
        .with_max_wait(Duration::from_secs(12))
        .wait_for_id("j-1")
        .await
        .expect_err("must time out");
    assert_eq!(err.kind(), ErrorKind::Timeout);
    // Polled at 5s, 10s and 15s; the deadline is seen before the next sleep.
    assert_eq!(mock.requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_first_poll() {
    let mock = MockHttpSend::new().respond(200, job_response(1));
    let token = CancellationToken::new();
    token.cancel();

    let err = client(&mock)
        .job_poller("deployVirtualMachine")
        .with_cancellation(token)
        .wait(&started_job())
        .await
        .expect_err("must be cancelled");
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(mock.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_while_pending() {
    let mut mock = MockHttpSend::new();
    for _ in 0..10 {
        mock = mock.respond(200, job_response(0));
    }
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        sleep(Duration::from_secs(7)).await;
        canceller.cancel();
    });

    let err = client(&mock)
        .job_poller("deployVirtualMachine")
        .with_cancellation(token)
        .wait_for_id("j-1")
        .await
        .expect_err("must be cancelled");
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_data_while_polling_is_an_error() {
    let mock = MockHttpSend::new().respond(431, "<html><body>431</body></html>");

    let err = client(&mock)
        .wait_for_job_id("j-1", "deployVirtualMachine")
        .await
        .expect_err("missing job must fail");
    assert_eq!(err.kind(), ErrorKind::ServiceError);
    assert!(err.message().contains("j-1"));
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_while_polling() {
    let mock = MockHttpSend::new().respond(200, job_response(0));

    let err = client(&mock)
        .wait_for_job_id("j-1", "deployVirtualMachine")
        .await
        .expect_err("must fail once the mock runs dry");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(mock.requests().len(), 2);
}
