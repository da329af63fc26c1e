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

use std::fmt::{Debug, Formatter};

use stacksign_core::utils::Redact;

/// Credential for cloudstack.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Public api key, sent as `apiKey`.
    pub api_key: String,
    /// Secret key used as the HMAC key.
    pub secret_key: String,
}

impl Credential {
    /// Create a new credential.
    ///
    /// Carriage returns are stripped: keys pasted from files often carry them.
    pub fn new(api_key: &str, secret_key: &str) -> Self {
        Self {
            api_key: api_key.replace('\r', ""),
            secret_key: secret_key.replace('\r', ""),
        }
    }

    /// Check if both keys are present.
    pub fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &Redact::from(&self.api_key))
            .field("secret_key", &Redact::from(&self.secret_key))
            .finish()
    }
}
