//! Typed resource endpoints.
//!
//! One accessor per backend collection on [`App`]. Forms are validated
//! before anything is sent; responses are decoded into the model types.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{ListQuery, Paginated, Resource, Transport};
use crate::app::{App, AppError, AppResult};
use crate::models::*;
use crate::session::TokenStore;
use crate::validation::{FormErrors, Validate};

/// Read access to one collection.
pub struct ReadEndpoint<'a, T, S, M> {
    app: &'a mut App<T, S>,
    resource: Resource,
    _model: PhantomData<fn() -> M>,
}

impl<'a, T: Transport, S: TokenStore, M: DeserializeOwned> ReadEndpoint<'a, T, S, M> {
    fn new(app: &'a mut App<T, S>, resource: Resource) -> Self {
        Self {
            app,
            resource,
            _model: PhantomData,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn list(&mut self, query: &ListQuery) -> AppResult<Paginated<M>> {
        let body = self.app.list_raw(self.resource, query)?;
        Ok(Paginated::from_value(body).map_err(crate::api::ApiError::from)?)
    }

    pub fn get(&mut self, id: i64) -> AppResult<M> {
        decode(self.app.get_raw(self.resource, id)?)
    }
}

/// Read and write access to one collection, with `F` as the form payload.
pub struct Endpoint<'a, T, S, M, F> {
    inner: ReadEndpoint<'a, T, S, M>,
    _form: PhantomData<fn(F)>,
}

impl<'a, T, S, M, F> Endpoint<'a, T, S, M, F>
where
    T: Transport,
    S: TokenStore,
    M: DeserializeOwned,
    F: Serialize + Validate,
{
    fn new(app: &'a mut App<T, S>, resource: Resource) -> Self {
        Self {
            inner: ReadEndpoint::new(app, resource),
            _form: PhantomData,
        }
    }

    pub fn resource(&self) -> Resource {
        self.inner.resource
    }

    pub fn list(&mut self, query: &ListQuery) -> AppResult<Paginated<M>> {
        self.inner.list(query)
    }

    pub fn get(&mut self, id: i64) -> AppResult<M> {
        self.inner.get(id)
    }

    /// Validate and submit a new record.
    pub fn create(&mut self, form: &F) -> AppResult<M> {
        form.validate()?;
        let body = encode(form)?;
        decode(self.inner.app.create_raw(self.inner.resource, body)?)
    }

    /// Validate and submit changes to an existing record.
    pub fn update(&mut self, id: i64, form: &F) -> AppResult<M> {
        form.validate()?;
        let body = encode(form)?;
        decode(self.inner.app.update_raw(self.inner.resource, id, body)?)
    }

    pub fn delete(&mut self, id: i64) -> AppResult<()> {
        self.inner.app.delete_raw(self.inner.resource, id)
    }
}

fn check<F: DeserializeOwned + Validate>(body: &serde_json::Value) -> Result<(), FormErrors> {
    let form: F = serde_json::from_value(body.clone()).map_err(|e| {
        let mut errors = FormErrors::new();
        errors.add("body", e.to_string());
        errors
    })?;
    form.validate()
}

/// Validate a raw JSON payload against the form type of `resource`.
pub fn validate_payload(resource: Resource, body: &serde_json::Value) -> Result<(), FormErrors> {
    match resource {
        Resource::Patients => check::<PatientForm>(body),
        Resource::Clinics => check::<ClinicForm>(body),
        Resource::Doctors | Resource::Nurses | Resource::LabTechnicians => check::<StaffForm>(body),
        Resource::Users => check::<UserForm>(body),
        Resource::TreatmentRequests => check::<TreatmentRequestForm>(body),
        Resource::LabRequests => check::<LabRequestForm>(body),
        Resource::Materials => check::<MaterialForm>(body),
        Resource::Lots => check::<LotForm>(body),
        Resource::Movements => check::<MovementForm>(body),
        Resource::Laborzettel => check::<LaborzettelForm>(body),
        Resource::Options => check::<SelectOptionForm>(body),
        Resource::Operations => check::<OperationForm>(body),
        Resource::Categories => check::<CategoryForm>(body),
        Resource::ActivityLogs => Ok(()),
    }
}

fn encode<F: Serialize>(form: &F) -> AppResult<serde_json::Value> {
    serde_json::to_value(form).map_err(|e| AppError::Api(e.into()))
}

fn decode<M: DeserializeOwned>(body: serde_json::Value) -> AppResult<M> {
    serde_json::from_value(body).map_err(|e| AppError::Api(e.into()))
}

impl<T: Transport, S: TokenStore> App<T, S> {
    pub fn patients(&mut self) -> Endpoint<'_, T, S, Patient, PatientForm> {
        Endpoint::new(self, Resource::Patients)
    }

    pub fn clinics(&mut self) -> Endpoint<'_, T, S, Clinic, ClinicForm> {
        Endpoint::new(self, Resource::Clinics)
    }

    pub fn doctors(&mut self) -> Endpoint<'_, T, S, StaffMember, StaffForm> {
        Endpoint::new(self, Resource::Doctors)
    }

    pub fn nurses(&mut self) -> Endpoint<'_, T, S, StaffMember, StaffForm> {
        Endpoint::new(self, Resource::Nurses)
    }

    pub fn lab_technicians(&mut self) -> Endpoint<'_, T, S, StaffMember, StaffForm> {
        Endpoint::new(self, Resource::LabTechnicians)
    }

    pub fn users(&mut self) -> Endpoint<'_, T, S, User, UserForm> {
        Endpoint::new(self, Resource::Users)
    }

    pub fn treatment_requests(
        &mut self,
    ) -> Endpoint<'_, T, S, TreatmentRequest, TreatmentRequestForm> {
        Endpoint::new(self, Resource::TreatmentRequests)
    }

    pub fn lab_requests(&mut self) -> Endpoint<'_, T, S, LabRequest, LabRequestForm> {
        Endpoint::new(self, Resource::LabRequests)
    }

    pub fn materials(&mut self) -> Endpoint<'_, T, S, InventoryMaterial, MaterialForm> {
        Endpoint::new(self, Resource::Materials)
    }

    pub fn lots(&mut self) -> Endpoint<'_, T, S, InventoryLot, LotForm> {
        Endpoint::new(self, Resource::Lots)
    }

    pub fn movements(&mut self) -> Endpoint<'_, T, S, InventoryMovement, MovementForm> {
        Endpoint::new(self, Resource::Movements)
    }

    pub fn laborzettel(&mut self) -> Endpoint<'_, T, S, Laborzettel, LaborzettelForm> {
        Endpoint::new(self, Resource::Laborzettel)
    }

    pub fn options(&mut self) -> Endpoint<'_, T, S, SelectOption, SelectOptionForm> {
        Endpoint::new(self, Resource::Options)
    }

    pub fn operations(&mut self) -> Endpoint<'_, T, S, Operation, OperationForm> {
        Endpoint::new(self, Resource::Operations)
    }

    pub fn categories(&mut self) -> Endpoint<'_, T, S, Category, CategoryForm> {
        Endpoint::new(self, Resource::Categories)
    }

    /// The activity log is written by the backend only.
    pub fn activity_logs(&mut self) -> ReadEndpoint<'_, T, S, ActivityLog> {
        ReadEndpoint::new(self, Resource::ActivityLogs)
    }
}
