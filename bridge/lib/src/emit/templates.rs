//! Template text for every generated artifact.
//!
//! Templates are plain data. A `{{name}}` marker is replaced by the value bound
//! to `name`; substituted values are never re-scanned, so generated content
//! can safely contain braces.

use std::borrow::Cow;

use crate::error::EmissionError;

/// A named piece of template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub text: Cow<'static, str>,
}

impl Template {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self {
            name,
            text: Cow::Borrowed(text),
        }
    }

    /// Same template slot, different text.
    pub fn with_text(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        self.text = text.into();
        self
    }
}

/// Substitutes every `{{name}}` in `template` with its value from `vars`.
///
/// ## Errors
///
/// - [`EmissionError::UnresolvedPlaceholder`] when a marker has no binding
/// - [`EmissionError::UnterminatedPlaceholder`] when `{{` is never closed
///
/// ## Examples
///
/// ```
/// use bridge_lib::emit::templates::{render, Template};
///
/// let greeting = Template::new("greeting", "hello {{who}}");
/// assert_eq!(render(&greeting, &[("who", "gopher")]).unwrap(), "hello gopher");
/// assert!(render(&greeting, &[]).is_err());
/// ```
pub fn render(template: &Template, vars: &[(&str, &str)]) -> Result<String, EmissionError> {
    let text = template.text.as_ref();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or(EmissionError::UnterminatedPlaceholder {
                template: template.name,
            })?;
        let name = after[..end].trim();

        let value = vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| EmissionError::UnresolvedPlaceholder {
                template: template.name,
                placeholder: name.to_string(),
            })?;

        out.push_str(value);
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

/// All templates used by the emitters.
///
/// `TemplateSet::default()` holds the built-in text; callers may swap any slot
/// before emitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    pub ts_file: Template,
    pub ts_method: Template,
    pub ts_interface: Template,
    pub ts_member: Template,
    pub ts_enum: Template,
    pub ts_enum_member: Template,
    pub server_file: Template,
    pub server_handler: Template,
    pub go_envelope: Template,
    pub go_envelope_field: Template,
    pub go_client_file: Template,
    pub go_client_method: Template,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            ts_file: Template::new("ts_file", TS_FILE),
            ts_method: Template::new("ts_method", TS_METHOD),
            ts_interface: Template::new("ts_interface", TS_INTERFACE),
            ts_member: Template::new("ts_member", TS_MEMBER),
            ts_enum: Template::new("ts_enum", TS_ENUM),
            ts_enum_member: Template::new("ts_enum_member", TS_ENUM_MEMBER),
            server_file: Template::new("server_file", SERVER_FILE),
            server_handler: Template::new("server_handler", SERVER_HANDLER),
            go_envelope: Template::new("go_envelope", GO_ENVELOPE),
            go_envelope_field: Template::new("go_envelope_field", GO_ENVELOPE_FIELD),
            go_client_file: Template::new("go_client_file", GO_CLIENT_FILE),
            go_client_method: Template::new("go_client_method", GO_CLIENT_METHOD),
        }
    }
}

pub const TS_FILE: &str = r#"// Code generated by bridge; DO NOT EDIT.

import { Injectable } from '@angular/core';
import { HttpClient } from '@angular/common/http';
import { firstValueFrom } from 'rxjs';
import { environment } from '../../environments/environment';

@Injectable({
  providedIn: 'root'
})
export class {{service}} {

  constructor(private http: HttpClient) {}
{{methods}}}
{{types}}"#;

pub const TS_METHOD: &str = r#"
  public async {{method}}(payload: {{method}}Request): Promise<{{method}}Response> {
    return firstValueFrom(
      this.http.post<{{method}}Response>(environment.BackendURL + '/{{route}}', JSON.stringify(payload))
    );
  }
"#;

pub const TS_INTERFACE: &str = r#"
export interface {{name}} {
{{members}}}
"#;

pub const TS_MEMBER: &str = "  {{name}}: {{kind}};\n";

pub const TS_ENUM: &str = r#"
export enum {{name}} {
{{members}}}
"#;

pub const TS_ENUM_MEMBER: &str = "  {{name}} = {{literal}},\n";

pub const SERVER_FILE: &str = r#"// Code generated by bridge; DO NOT EDIT.

package {{package}}

import (
{{imports}})

// AuthFunc decides whether a bearer token may call an endpoint.
type AuthFunc func(ctx context.Context, token string) (bool, error)

// AuthConfig holds per-endpoint predicates. A predicate registered under
// AllEndpoints replaces every per-endpoint predicate.
type AuthConfig map[Endpoint]AuthFunc

type Server struct {
	AdditionalAuth AuthConfig
	Basic          AuthFunc
	API            {{api_type}}
}

func New(api {{api_type}}, a AuthConfig, basicAuth AuthFunc) *Server {
	s := &Server{
		AdditionalAuth: a,
		Basic:          basicAuth,
		API:            api,
	}

	s.registerHandlers()

	return s
}

type Endpoint int

const (
{{endpoints}})

func (ep Endpoint) Path() string {
	switch ep {
	case AllEndpoints:
		return "**"
{{paths}}	default:
		return ""
	}
}

func (s *Server) registerHandlers() {
{{routes}}}

func (s *Server) Wrap(e Endpoint, fn http.HandlerFunc) http.HandlerFunc {
	return func(w http.ResponseWriter, r *http.Request) {
		w.Header().Set("Access-Control-Allow-Origin", "*")
		w.Header().Set("Access-Control-Allow-Headers", "Content-Type, Authorization")

		if r.Method == http.MethodOptions {
			w.WriteHeader(http.StatusOK)
			return
		}

		if s.Basic != nil {
			if msg, allowed := checkAuth(r, s.Basic); !allowed {
				http.Error(w, msg, http.StatusUnauthorized)
				return
			}
		}

		authFunc, ok := s.AdditionalAuth[AllEndpoints]
		if !ok {
			authFunc, ok = s.AdditionalAuth[e]
		}
		if ok {
			if msg, allowed := checkAuth(r, authFunc); !allowed {
				http.Error(w, msg, http.StatusUnauthorized)
				return
			}
		}

		fn(w, r)
	}
}

func checkAuth(r *http.Request, authFunc AuthFunc) (string, bool) {
	token := strings.TrimSpace(r.Header.Get("Authorization"))
	allow, err := authFunc(r.Context(), token)
	if err != nil {
		return "no authorization token present", false
	}

	if !allow {
		return "unauthorised", false
	}

	return "", true
}

type contextKey string

const authorizationKey contextKey = "authorization_header"

func withAuthorizationToken(ctx context.Context, r *http.Request) context.Context {
	return context.WithValue(ctx, authorizationKey, strings.TrimSpace(r.Header.Get("Authorization")))
}

// AuthorizationToken returns the trimmed Authorization header of the request
// being handled, or "" when there is none.
func AuthorizationToken(ctx context.Context) string {
	token, _ := ctx.Value(authorizationKey).(string)
	return token
}
{{handlers}}"#;

pub const SERVER_HANDLER: &str = r#"{{envelopes}}
func Handle{{method}}(api {{api_type}}) http.HandlerFunc {
	return func(w http.ResponseWriter, r *http.Request) {
		b, err := io.ReadAll(r.Body)
		if err != nil {
			http.Error(w, err.Error(), http.StatusBadRequest)
			return
		}

		var req {{method}}Request
		err = json.Unmarshal(b, &req)
		if err != nil {
			http.Error(w, err.Error(), http.StatusBadRequest)
			return
		}

		ctx := withAuthorizationToken(r.Context(), r)

{{invoke}}
		respBody, err := json.Marshal(resp)
		if err != nil {
			http.Error(w, err.Error(), http.StatusInternalServerError)
			return
		}

		w.Header().Set("Content-Type", "application/json")
		w.WriteHeader(http.StatusOK)
		_, _ = w.Write(respBody)
	}
}
"#;

pub const GO_ENVELOPE: &str = r#"
type {{name}} struct {
{{fields}}}
"#;

pub const GO_ENVELOPE_FIELD: &str = "\t{{name}} {{kind}} `json:\"{{wire}}\"`\n";

pub const GO_CLIENT_FILE: &str = r#"// Code generated by bridge; DO NOT EDIT.

package {{package}}

import (
{{imports}})

// Client calls the {{service}} API over HTTP.
type Client struct {
	Address    string
	HTTPClient *http.Client
	// Token is sent as the Authorization header when non-empty.
	Token string
}

func NewClient(address string) *Client {
	return &Client{Address: address, HTTPClient: http.DefaultClient}
}

func (c *Client) post(ctx context.Context, path string, req, resp any) error {
	b, err := json.Marshal(req)
	if err != nil {
		return err
	}

	httpReq, err := http.NewRequestWithContext(ctx, http.MethodPost, c.Address+path, bytes.NewReader(b))
	if err != nil {
		return err
	}
	httpReq.Header.Set("Content-Type", "application/json")
	if c.Token != "" {
		httpReq.Header.Set("Authorization", c.Token)
	}

	httpResp, err := c.HTTPClient.Do(httpReq)
	if err != nil {
		return err
	}
	defer httpResp.Body.Close()

	respBody, err := io.ReadAll(httpResp.Body)
	if err != nil {
		return err
	}

	if httpResp.StatusCode != http.StatusOK {
		return fmt.Errorf("%s: %s: %s", path, httpResp.Status, strings.TrimSpace(string(respBody)))
	}

	return json.Unmarshal(respBody, resp)
}
{{methods}}"#;

pub const GO_CLIENT_METHOD: &str = r#"{{envelopes}}
func (c *Client) {{method}}(ctx context.Context{{params}}) ({{results}}error) {
	req := {{method}}Request{
{{request_fields}}	}

	var resp {{method}}Response
	err := c.post(ctx, "{{route}}", &req, &resp)

	return {{returns}}err
}
"#;
